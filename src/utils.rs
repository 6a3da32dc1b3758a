pub mod response;
pub use response as Response;

pub mod image;
pub use image as Image;
