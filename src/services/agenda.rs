use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::{
    AgendaFilter, AgendaRow, AgendaView, Booking, BookingStatus, FetchState, NormalizedBooking,
    NotificationLevel,
};
use crate::services::colors::{ColorMemo, StaffColors};
use crate::services::{filter, normalizer, optimistic, ordering, status};
use crate::state::AppState;

pub const INVALID_TIME_LABEL: &str = "Invalid date/time";
pub const MISSING_CUSTOMER_LABEL: &str = "Customer unavailable";
pub const MISSING_SERVICE_LABEL: &str = "Service unavailable";
pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// One fetched collection together with the colors derived from it.
#[derive(Debug)]
pub struct Agenda {
    pub bookings: Arc<Vec<NormalizedBooking>>,
    pub colors: Arc<StaffColors>,
    pub fetched_at: DateTime<Utc>,
}

impl Agenda {
    fn with_bookings(&self, bookings: Vec<NormalizedBooking>) -> Self {
        // Status patches never touch barbers, so the color map carries over.
        Self {
            bookings: Arc::new(bookings),
            colors: Arc::clone(&self.colors),
            fetched_at: self.fetched_at,
        }
    }

    pub fn find(&self, id: &str) -> Option<&NormalizedBooking> {
        self.bookings.iter().find(|b| b.booking.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch already landed; this response was dropped.
    Stale,
}

#[derive(Default)]
struct Inner {
    state: FetchState<Arc<Agenda>>,
    last_good: Option<Arc<Agenda>>,
    issued: u64,
    applied: u64,
    colors: ColorMemo,
    in_flight: HashSet<String>,
}

impl Inner {
    fn replace_agenda(&mut self, agenda: Arc<Agenda>) {
        if let FetchState::Success(current) = &mut self.state {
            *current = Arc::clone(&agenda);
        }
        self.last_good = Some(agenda);
    }

    fn patch(&mut self, id: &str, f: impl FnOnce(&mut NormalizedBooking)) -> bool {
        let Some(agenda) = self.last_good.clone() else {
            return false;
        };
        let Some(idx) = agenda.bookings.iter().position(|b| b.booking.id == id) else {
            return false;
        };

        let mut bookings = agenda.bookings.as_ref().clone();
        f(&mut bookings[idx]);
        self.replace_agenda(Arc::new(agenda.with_bookings(bookings)));
        true
    }
}

/// In-memory holder of the latest booking collection. The lock is never
/// held across an await.
#[derive(Default)]
pub struct AgendaStore {
    inner: Mutex<Inner>,
}

impl AgendaStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks the store as loading and hands out a ticket for the request.
    pub fn begin_fetch(&self) -> u64 {
        let mut inner = self.lock();
        inner.issued += 1;
        inner.state = FetchState::Loading;
        inner.issued
    }

    pub fn complete_fetch(
        &self,
        ticket: u64,
        result: Result<Vec<Booking>, String>,
        now: DateTime<Utc>,
    ) -> FetchOutcome {
        let mut inner = self.lock();
        if ticket <= inner.applied {
            return FetchOutcome::Stale;
        }
        inner.applied = ticket;
        let still_loading = ticket < inner.issued;

        match result {
            Ok(raw) => {
                let bookings = Arc::new(normalizer::normalize_all(raw, now));
                let colors = inner.colors.colors_for(&bookings);
                let agenda = Arc::new(Agenda {
                    bookings,
                    colors,
                    fetched_at: now,
                });
                inner.last_good = Some(Arc::clone(&agenda));
                inner.state = if still_loading {
                    FetchState::Loading
                } else {
                    FetchState::Success(agenda)
                };
            }
            Err(message) => {
                if !still_loading {
                    inner.state = FetchState::Error(message);
                }
            }
        }

        FetchOutcome::Applied
    }

    pub fn state(&self) -> FetchState<Arc<Agenda>> {
        self.lock().state.clone()
    }

    /// The collection views should show: the current one, or the last one
    /// that loaded successfully while a fetch is pending or failed.
    pub fn current(&self) -> Option<Arc<Agenda>> {
        self.lock().last_good.clone()
    }

    pub fn pending(&self) -> HashSet<String> {
        self.lock().in_flight.clone()
    }

    /// Applies `new_status` locally and returns the status it replaced.
    /// Fails if another change for the same booking is still outstanding.
    pub fn apply_status(&self, id: &str, new_status: &BookingStatus) -> Result<BookingStatus, AppError> {
        let mut inner = self.lock();
        if inner.in_flight.contains(id) {
            return Err(AppError::Conflict(format!(
                "a status change for booking {id} is already in progress"
            )));
        }

        let mut previous = None;
        let found = inner.patch(id, |b| {
            previous = Some(std::mem::replace(&mut b.booking.status, new_status.clone()));
        });

        match previous {
            Some(previous) if found => {
                inner.in_flight.insert(id.to_string());
                Ok(previous)
            }
            _ => Err(AppError::NotFound(format!("booking {id}"))),
        }
    }

    /// Takes the backend's version of booking `id` after a successful change.
    /// The record is matched by the requested id, not the one echoed back.
    pub fn confirm_status(&self, id: &str, updated: Booking, now: DateTime<Utc>) {
        let mut inner = self.lock();
        inner.in_flight.remove(id);

        let mut normalized = normalizer::normalize(updated, now);
        normalized.booking.id = id.to_string();
        let staff_unchanged = inner
            .last_good
            .as_ref()
            .and_then(|a| a.find(id))
            .is_some_and(|b| b.staff_id() == normalized.staff_id());

        if staff_unchanged {
            inner.patch(id, |b| *b = normalized);
        } else {
            // A reassigned barber would need a new color map; keep the local
            // status and let the next fetch bring the rest.
            tracing::debug!(booking_id = %id, "barber changed server-side, keeping local record");
            inner.patch(id, |b| b.booking.status = normalized.booking.status.clone());
        }
    }

    /// Restores `previous` unless something newer (a fresh fetch) already
    /// replaced the optimistic value.
    pub fn rollback_status(&self, id: &str, optimistic: &BookingStatus, previous: BookingStatus) {
        let mut inner = self.lock();
        inner.in_flight.remove(id);
        inner.patch(id, |b| {
            if &b.booking.status == optimistic {
                b.booking.status = previous;
            }
        });
    }

    pub fn remove(&self, id: &str) -> bool {
        let mut inner = self.lock();
        let Some(agenda) = inner.last_good.clone() else {
            return false;
        };
        let before = agenda.bookings.len();
        let bookings: Vec<_> = agenda
            .bookings
            .iter()
            .filter(|b| b.booking.id != id)
            .cloned()
            .collect();
        if bookings.len() == before {
            return false;
        }
        inner.replace_agenda(Arc::new(agenda.with_bookings(bookings)));
        true
    }
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| INVALID_TIME_LABEL.to_string())
}

pub fn to_row(b: &NormalizedBooking, colors: &StaffColors, pending: bool) -> AgendaRow {
    let booking = &b.booking;
    AgendaRow {
        id: booking.id.clone(),
        date_time: format_time(b.time),
        time_valid: b.time_valid(),
        is_past: b.is_past,
        customer_name: booking
            .customer
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| MISSING_CUSTOMER_LABEL.to_string()),
        customer_phone: booking.customer.as_ref().and_then(|c| c.phone.clone()),
        barber_id: b.staff_id().map(str::to_string),
        barber_name: booking
            .barber
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_else(|| UNASSIGNED_LABEL.to_string()),
        service_name: booking
            .service
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_else(|| MISSING_SERVICE_LABEL.to_string()),
        price: booking.service.as_ref().and_then(|s| s.price),
        status: status::present(&booking.status, b.is_past),
        color: colors.color_for(b.staff_id()).to_string(),
        notes: booking.notes.clone(),
        pending,
    }
}

/// Pure view of the store: filter, order and present. `is_past` is
/// re-evaluated against `now` so a collection fetched a while ago still
/// classifies correctly.
pub fn render(
    state: &FetchState<Arc<Agenda>>,
    last_good: Option<&Agenda>,
    filter: &AgendaFilter,
    pending: &HashSet<String>,
    now: DateTime<Utc>,
) -> AgendaView {
    let agenda = match state {
        FetchState::Success(agenda) => Some(agenda.as_ref()),
        FetchState::Idle => None,
        FetchState::Loading | FetchState::Error(_) => last_good,
    };

    let rows = match agenda {
        Some(agenda) => {
            let current = normalizer::reevaluate(&agenda.bookings, now);
            let mut visible = filter::apply(&current, filter);
            ordering::sort(&mut visible);
            visible
                .into_iter()
                .map(|b| to_row(b, &agenda.colors, pending.contains(&b.booking.id)))
                .collect()
        }
        None => vec![],
    };

    AgendaView {
        state: state.as_str(),
        error: state.error().map(str::to_string),
        fetched_at: agenda.map(|a| a.fetched_at.to_rfc3339()),
        total: agenda.map(|a| a.bookings.len()).unwrap_or(0),
        rows,
    }
}

pub fn render_current(state: &AppState, filter: &AgendaFilter) -> AgendaView {
    let store = &state.agenda;
    let current = store.current();
    render(
        &store.state(),
        current.as_deref(),
        filter,
        &store.pending(),
        Utc::now(),
    )
}

pub async fn refresh(state: &AppState) -> Result<FetchOutcome, AppError> {
    let ticket = state.agenda.begin_fetch();
    let result = state.api.list_bookings().await;

    match result {
        Ok(bookings) => {
            let count = bookings.len();
            let outcome = state.agenda.complete_fetch(ticket, Ok(bookings), Utc::now());
            match outcome {
                FetchOutcome::Applied => tracing::info!(ticket, count, "agenda refreshed"),
                FetchOutcome::Stale => tracing::debug!(ticket, "discarded stale agenda response"),
            }
            Ok(outcome)
        }
        Err(e) => {
            let err = AppError::upstream(e);
            tracing::error!(ticket, error = %err, "failed to fetch bookings");
            let outcome = state
                .agenda
                .complete_fetch(ticket, Err(err.to_string()), Utc::now());
            if outcome == FetchOutcome::Applied {
                state
                    .notifier
                    .notify(NotificationLevel::Warning, "Could not load bookings", None);
            }
            Err(err)
        }
    }
}

/// Loads the agenda on first use; afterwards only explicit refreshes or
/// writes touch the backend.
pub async fn ensure_loaded(state: &AppState) {
    if matches!(state.agenda.state(), FetchState::Idle) {
        // failure is recorded in the fetch state and rendered from there
        let _ = refresh(state).await;
    }
}

pub async fn change_status(
    state: &AppState,
    id: &str,
    new_status: BookingStatus,
) -> Result<AgendaRow, AppError> {
    if !new_status.is_known() {
        return Err(AppError::Validation(format!(
            "unsupported status \"{}\"",
            new_status.as_str()
        )));
    }

    let result = optimistic::run(
        || -> Result<BookingStatus, AppError> {
            let previous = state.agenda.apply_status(id, &new_status)?;
            tracing::info!(booking_id = id, from = previous.as_str(), to = new_status.as_str(), "status change");
            Ok(previous)
        },
        async {
            state
                .api
                .update_status(id, &new_status)
                .await
                .map_err(AppError::upstream)
        },
        |previous| state.agenda.rollback_status(id, &new_status, previous),
    )
    .await;

    match result {
        Ok(updated) => {
            state.agenda.confirm_status(id, updated, Utc::now());
            state.notifier.notify(
                NotificationLevel::Info,
                format!("Booking marked as {}", new_status.as_str()),
                Some(id),
            );
        }
        Err(err @ (AppError::Conflict(_) | AppError::NotFound(_))) => return Err(err),
        Err(err) => {
            tracing::error!(booking_id = id, error = %err, "status change failed, rolled back");
            state.notifier.notify(
                NotificationLevel::Error,
                "Could not update booking status; change was reverted",
                Some(id),
            );
            return Err(err);
        }
    }

    let agenda = state
        .agenda
        .current()
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;
    let current = normalizer::reevaluate(&agenda.bookings, Utc::now());
    current
        .iter()
        .find(|b| b.booking.id == id)
        .map(|b| to_row(b, &agenda.colors, false))
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

/// Deletes a booking of the loaded agenda. Ids the agenda does not hold are
/// rejected before anything is sent to the backend.
pub async fn delete(state: &AppState, id: &str) -> Result<(), AppError> {
    let known = state.agenda.current().is_some_and(|a| a.find(id).is_some());
    if !known {
        return Err(AppError::NotFound(format!("booking {id}")));
    }
    if state.agenda.pending().contains(id) {
        return Err(AppError::Conflict(format!(
            "a status change for booking {id} is already in progress"
        )));
    }

    state.api.delete_booking(id).await.map_err(|e| {
        let err = AppError::upstream(e);
        tracing::error!(booking_id = id, error = %err, "failed to delete booking");
        state
            .notifier
            .notify(NotificationLevel::Error, "Could not delete booking", Some(id));
        err
    })?;

    if !state.agenda.remove(id) {
        tracing::debug!(booking_id = id, "deleted booking was already gone from the local agenda");
    }
    state
        .notifier
        .notify(NotificationLevel::Info, "Booking deleted", Some(id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerRef, ServiceRef, StaffRef, StatusKind};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn booking(id: &str, time: &str, staff: Option<&str>) -> Booking {
        Booking {
            id: id.to_string(),
            date_time: Some(time.to_string()),
            status: BookingStatus::Booked,
            customer: Some(CustomerRef {
                id: "c-1".to_string(),
                name: "Alice".to_string(),
                phone: None,
            }),
            barber: staff.map(|s| StaffRef {
                id: s.to_string(),
                name: format!("Barber {s}"),
            }),
            service: Some(ServiceRef {
                id: "svc-1".to_string(),
                name: "Haircut".to_string(),
                price: Some(50.0),
                duration: Some(30),
            }),
            notes: None,
        }
    }

    fn loaded_store(bookings: Vec<Booking>) -> AgendaStore {
        let store = AgendaStore::new();
        let ticket = store.begin_fetch();
        assert_eq!(store.complete_fetch(ticket, Ok(bookings), now()), FetchOutcome::Applied);
        store
    }

    fn view(store: &AgendaStore, filter: &AgendaFilter) -> AgendaView {
        let current = store.current();
        render(&store.state(), current.as_deref(), filter, &store.pending(), now())
    }

    #[test]
    fn test_idle_renders_empty() {
        let store = AgendaStore::new();
        let v = view(&store, &AgendaFilter::default());
        assert_eq!(v.state, "idle");
        assert!(v.rows.is_empty());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let store = AgendaStore::new();
        let first = store.begin_fetch();
        let second = store.begin_fetch();

        let newer = vec![booking("new", "2025-06-02T10:00:00Z", Some("s1"))];
        assert_eq!(store.complete_fetch(second, Ok(newer), now()), FetchOutcome::Applied);

        let older = vec![booking("old", "2025-06-02T10:00:00Z", Some("s1"))];
        assert_eq!(store.complete_fetch(first, Ok(older), now()), FetchOutcome::Stale);

        let v = view(&store, &AgendaFilter::default());
        assert_eq!(v.state, "success");
        assert_eq!(v.rows[0].id, "new");
    }

    #[test]
    fn test_older_response_applies_while_newer_pending() {
        let store = AgendaStore::new();
        let first = store.begin_fetch();
        let _second = store.begin_fetch();

        let older = vec![booking("old", "2025-06-02T10:00:00Z", None)];
        assert_eq!(store.complete_fetch(first, Ok(older), now()), FetchOutcome::Applied);

        let v = view(&store, &AgendaFilter::default());
        assert_eq!(v.state, "loading");
        assert_eq!(v.rows.len(), 1);
    }

    #[test]
    fn test_error_keeps_last_good_rows() {
        let store = loaded_store(vec![booking("b-1", "2025-06-02T10:00:00Z", None)]);
        let ticket = store.begin_fetch();
        store.complete_fetch(ticket, Err("timeout".to_string()), now());

        let v = view(&store, &AgendaFilter::default());
        assert_eq!(v.state, "error");
        assert_eq!(v.error.as_deref(), Some("timeout"));
        assert_eq!(v.rows.len(), 1);
    }

    #[test]
    fn test_rows_have_placeholders_and_order() {
        let mut orphan = booking("orphan", "not-a-date", None);
        orphan.customer = None;
        orphan.service = None;

        let store = loaded_store(vec![
            orphan,
            booking("past", "2025-05-30T10:00:00Z", Some("s1")),
            booking("soon", "2025-06-01T13:00:00Z", Some("s2")),
        ]);

        let v = view(&store, &AgendaFilter::default());
        let ids: Vec<_> = v.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["soon", "past", "orphan"]);

        let orphan = &v.rows[2];
        assert_eq!(orphan.date_time, INVALID_TIME_LABEL);
        assert_eq!(orphan.customer_name, MISSING_CUSTOMER_LABEL);
        assert_eq!(orphan.service_name, MISSING_SERVICE_LABEL);
        assert_eq!(orphan.barber_name, UNASSIGNED_LABEL);
        assert_eq!(orphan.color, crate::services::colors::FALLBACK_COLOR);

        assert_eq!(v.rows[1].status.kind, StatusKind::Occurred);
        assert_eq!(v.rows[0].status.kind, StatusKind::Scheduled);
    }

    #[test]
    fn test_colors_survive_filter_changes() {
        let store = loaded_store(vec![
            booking("a", "2025-06-02T10:00:00Z", Some("s1")),
            booking("b", "2025-06-03T10:00:00Z", Some("s2")),
        ]);

        let all = view(&store, &AgendaFilter::default());
        let only_s2 = view(
            &store,
            &AgendaFilter {
                staff: crate::models::StaffFilter::Only("s2".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(only_s2.rows.len(), 1);
        assert_eq!(only_s2.rows[0].color, all.rows[1].color);
    }

    #[test]
    fn test_apply_and_rollback_status() {
        let store = loaded_store(vec![booking("b-1", "2025-06-02T10:00:00Z", None)]);

        let previous = store.apply_status("b-1", &BookingStatus::Completed).unwrap();
        assert_eq!(previous, BookingStatus::Booked);
        assert!(store.pending().contains("b-1"));
        assert_eq!(
            store.current().unwrap().find("b-1").unwrap().booking.status,
            BookingStatus::Completed
        );

        store.rollback_status("b-1", &BookingStatus::Completed, previous);
        assert!(store.pending().is_empty());
        assert_eq!(
            store.current().unwrap().find("b-1").unwrap().booking.status,
            BookingStatus::Booked
        );
    }

    #[test]
    fn test_second_change_while_in_flight_is_rejected() {
        let store = loaded_store(vec![booking("b-1", "2025-06-02T10:00:00Z", None)]);
        store.apply_status("b-1", &BookingStatus::Confirmed).unwrap();
        let err = store.apply_status("b-1", &BookingStatus::Canceled).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_apply_status_unknown_booking() {
        let store = loaded_store(vec![]);
        let err = store.apply_status("nope", &BookingStatus::Confirmed).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.pending().is_empty());
    }

    #[test]
    fn test_rollback_does_not_clobber_fresh_fetch() {
        let store = loaded_store(vec![booking("b-1", "2025-06-02T10:00:00Z", None)]);
        let previous = store.apply_status("b-1", &BookingStatus::Canceled).unwrap();

        let mut fresh = booking("b-1", "2025-06-02T10:00:00Z", None);
        fresh.status = BookingStatus::Confirmed;
        let ticket = store.begin_fetch();
        store.complete_fetch(ticket, Ok(vec![fresh]), now());

        store.rollback_status("b-1", &BookingStatus::Canceled, previous);
        assert_eq!(
            store.current().unwrap().find("b-1").unwrap().booking.status,
            BookingStatus::Confirmed
        );
    }

    #[test]
    fn test_status_patch_keeps_color_map() {
        let store = loaded_store(vec![booking("b-1", "2025-06-02T10:00:00Z", Some("s1"))]);
        let before = store.current().unwrap().colors.clone();
        store.apply_status("b-1", &BookingStatus::Confirmed).unwrap();
        let after = store.current().unwrap().colors.clone();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_confirm_takes_server_record() {
        let store = loaded_store(vec![booking("b-1", "2025-06-02T10:00:00Z", Some("s1"))]);
        store.apply_status("b-1", &BookingStatus::Confirmed).unwrap();

        let mut server = booking("b-1", "2025-06-02T10:00:00Z", Some("s1"));
        server.status = BookingStatus::Confirmed;
        server.notes = Some("confirmed by phone".to_string());
        store.confirm_status("b-1", server, now());

        let agenda = store.current().unwrap();
        let b = agenda.find("b-1").unwrap();
        assert_eq!(b.booking.notes.as_deref(), Some("confirmed by phone"));
        assert!(store.pending().is_empty());
    }

    #[test]
    fn test_confirm_matches_requested_id() {
        let store = loaded_store(vec![booking("7", "2025-06-02T10:00:00Z", Some("s1"))]);
        store.apply_status("7", &BookingStatus::Confirmed).unwrap();

        // backend echoes the id in another form
        let mut server = booking("007", "2025-06-02T10:00:00Z", Some("s1"));
        server.status = BookingStatus::Confirmed;
        store.confirm_status("7", server, now());

        assert!(store.pending().is_empty());
        let agenda = store.current().unwrap();
        assert_eq!(agenda.find("7").unwrap().booking.status, BookingStatus::Confirmed);
        assert!(agenda.find("007").is_none());
        assert!(store.apply_status("7", &BookingStatus::Completed).is_ok());
    }

    #[test]
    fn test_remove() {
        let store = loaded_store(vec![
            booking("b-1", "2025-06-02T10:00:00Z", None),
            booking("b-2", "2025-06-03T10:00:00Z", None),
        ]);
        assert!(store.remove("b-1"));
        assert!(!store.remove("b-1"));
        assert_eq!(store.current().unwrap().bookings.len(), 1);
    }

    #[test]
    fn test_past_flag_follows_render_time() {
        let store = loaded_store(vec![booking("b-1", "2025-06-01T12:30:00Z", None)]);
        let current = store.current();
        let later = now() + Duration::hours(1);
        let v = render(
            &store.state(),
            current.as_deref(),
            &AgendaFilter::default(),
            &HashSet::new(),
            later,
        );
        assert!(v.rows[0].is_past);
        assert_eq!(v.rows[0].status.kind, StatusKind::Occurred);
    }
}
