pub mod backend_lucky_wheel;
