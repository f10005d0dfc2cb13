mod login;
mod permission;
mod session;
mod user;

pub use login::*;
pub use permission::*;
pub use session::*;
pub use user::*;
