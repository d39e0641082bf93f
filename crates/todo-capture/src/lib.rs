//! # todo-capture
//!
//! Getting image bytes for a task from the outside world.
//!
//! Two collaborators sit behind traits so front ends can plug in their own:
//! - [`PermissionProvider`]: asks whether the camera / photo library may be used
//! - [`ImagePicker`]: returns raw image bytes, or reports that the user cancelled
//!
//! [`acquire_image`] runs the gated flow: no picker call happens unless access
//! was granted.

mod acquire;
mod permission;
mod picker;

pub use acquire::{acquire_image, Acquisition};
pub use permission::{Access, MockPermissions, PermissionProvider, StaticPermissions};
pub use picker::{FilePicker, ImagePicker, ImageSource, MockPicker, Picked};
