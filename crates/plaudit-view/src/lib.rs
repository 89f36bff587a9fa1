//! plaudit-view - Testimonial schema and synchronized view controller.

mod testimonial;
mod view;

pub use testimonial::{Testimonial, TestimonialDraft};
pub use view::TestimonialView;
