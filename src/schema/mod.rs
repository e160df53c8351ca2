pub mod gender;
