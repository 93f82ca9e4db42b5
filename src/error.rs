pub mod action_error;
