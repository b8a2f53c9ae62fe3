pub mod agenda;
pub mod barber;
pub mod booking;
pub mod calendar;
pub mod de;
pub mod fetch;
pub mod notification;
pub mod product;
pub mod status;

pub use agenda::{AgendaFilter, AgendaQuery, AgendaRow, AgendaView, DayFilter, StaffFilter};
pub use barber::{Barber, BarberView};
pub use booking::{Booking, BookingStatus, CustomerRef, NormalizedBooking, ServiceRef, StaffRef};
pub use calendar::{CalendarEvent, CalendarQuery};
pub use fetch::FetchState;
pub use notification::{Notification, NotificationLevel};
pub use product::{FieldError, Product, ProductDraft, ProductRow};
pub use status::{StatusBadge, StatusChangeRequest, StatusKind};
