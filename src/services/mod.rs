pub mod agenda;
pub mod backend;
pub mod calendar;
pub mod colors;
pub mod dashboard;
pub mod filter;
pub mod normalizer;
pub mod notifications;
pub mod optimistic;
pub mod ordering;
pub mod status;
