//! SDL side of the desktop host. Nothing here touches machine state except
//! through the public `Machine` API.

pub mod audio;
pub mod keyboard;
pub mod window;
