use std::collections::HashMap;
use std::sync::Arc;

use crate::models::NormalizedBooking;

pub const PALETTE: [&str; 10] = [
    "#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
    "#6366f1", "#84cc16",
];

/// Used for bookings without a barber and barbers absent from the collection.
pub const FALLBACK_COLOR: &str = "#4b5563";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffColors {
    colors: HashMap<String, &'static str>,
}

impl StaffColors {
    /// Assigns palette colors in order of first appearance. The input must be
    /// the collection as received, not the display order.
    pub fn assign(bookings: &[NormalizedBooking]) -> Self {
        let mut colors = HashMap::new();
        for staff_id in bookings.iter().filter_map(NormalizedBooking::staff_id) {
            if !colors.contains_key(staff_id) {
                let color = PALETTE[colors.len() % PALETTE.len()];
                colors.insert(staff_id.to_string(), color);
            }
        }
        Self { colors }
    }

    pub fn get(&self, staff_id: &str) -> Option<&'static str> {
        self.colors.get(staff_id).copied()
    }

    pub fn color_for(&self, staff_id: Option<&str>) -> &'static str {
        staff_id
            .and_then(|id| self.get(id))
            .unwrap_or(FALLBACK_COLOR)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Caches the color map for one collection. The map is rebuilt only when a
/// different collection `Arc` is passed in, so filter changes can never move
/// a barber to another color.
#[derive(Debug, Default)]
pub struct ColorMemo {
    source: Option<Arc<Vec<NormalizedBooking>>>,
    colors: Arc<StaffColors>,
}

impl ColorMemo {
    pub fn colors_for(&mut self, bookings: &Arc<Vec<NormalizedBooking>>) -> Arc<StaffColors> {
        let fresh = match &self.source {
            Some(source) => !Arc::ptr_eq(source, bookings),
            None => true,
        };

        if fresh {
            self.colors = Arc::new(StaffColors::assign(bookings));
            self.source = Some(Arc::clone(bookings));
            tracing::debug!(staff = self.colors.len(), "recomputed staff colors");
        }

        Arc::clone(&self.colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Booking, BookingStatus, StaffRef};

    fn with_staff(id: &str, staff: Option<&str>) -> NormalizedBooking {
        NormalizedBooking {
            booking: Booking {
                id: id.to_string(),
                date_time: None,
                status: BookingStatus::Booked,
                customer: None,
                barber: staff.map(|s| StaffRef {
                    id: s.to_string(),
                    name: s.to_uppercase(),
                }),
                service: None,
                notes: None,
            },
            time: None,
            is_past: false,
        }
    }

    #[test]
    fn test_first_seen_order() {
        let bookings: Vec<_> = ["b", "a", "b", "a", "c"]
            .iter()
            .enumerate()
            .map(|(i, s)| with_staff(&i.to_string(), Some(s)))
            .collect();

        let colors = StaffColors::assign(&bookings);
        assert_eq!(colors.len(), 3);
        assert_eq!(colors.get("b"), Some(PALETTE[0]));
        assert_eq!(colors.get("a"), Some(PALETTE[1]));
        assert_eq!(colors.get("c"), Some(PALETTE[2]));
    }

    #[test]
    fn test_palette_wraps_after_ten() {
        let bookings: Vec<_> = (0..11)
            .map(|i| with_staff(&i.to_string(), Some(&format!("s{i}"))))
            .collect();

        let colors = StaffColors::assign(&bookings);
        assert_eq!(colors.get("s9"), Some(PALETTE[9]));
        assert_eq!(colors.get("s10"), Some(PALETTE[0]));
    }

    #[test]
    fn test_unassigned_bookings_are_skipped() {
        let bookings = vec![
            with_staff("1", None),
            with_staff("2", Some("x")),
            with_staff("3", None),
        ];
        let colors = StaffColors::assign(&bookings);
        assert_eq!(colors.get("x"), Some(PALETTE[0]));
        assert_eq!(colors.color_for(None), FALLBACK_COLOR);
        assert_eq!(colors.color_for(Some("ghost")), FALLBACK_COLOR);
    }

    #[test]
    fn test_recompute_is_stable() {
        let bookings = vec![with_staff("1", Some("b")), with_staff("2", Some("a"))];
        assert_eq!(StaffColors::assign(&bookings), StaffColors::assign(&bookings));
    }

    #[test]
    fn test_memo_reuses_same_collection() {
        let mut memo = ColorMemo::default();
        let bookings = Arc::new(vec![with_staff("1", Some("b")), with_staff("2", Some("a"))]);

        let first = memo.colors_for(&bookings);
        let second = memo.colors_for(&bookings);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_memo_recomputes_on_new_collection() {
        let mut memo = ColorMemo::default();
        let first = memo.colors_for(&Arc::new(vec![with_staff("1", Some("a"))]));
        let second = memo.colors_for(&Arc::new(vec![
            with_staff("1", Some("z")),
            with_staff("2", Some("a")),
        ]));

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.get("a"), Some(PALETTE[0]));
        assert_eq!(second.get("a"), Some(PALETTE[1]));
    }
}
