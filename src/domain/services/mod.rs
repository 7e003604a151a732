pub mod booking_service;
pub mod ledger;
pub mod recurrence;
pub mod slots;
