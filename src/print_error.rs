use std::fmt::Display;

pub trait PrintError<T> {
	/// Prints the error after `msg` and hands back the value, if any.
	fn print_err<M: Display>(self, msg: M) -> Option<T>;
}

impl<T, E: Display> PrintError<T> for Result<T, E> {
	fn print_err<M: Display>(self, msg: M) -> Option<T> {
		match self {
			Ok(value) => Some(value),
			Err(e) => {
				eprintln!("{}: {}", msg, e);
				None
			},
		}
	}
}
