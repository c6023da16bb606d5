pub mod verify_session;
