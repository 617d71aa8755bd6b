pub mod event_journal;
