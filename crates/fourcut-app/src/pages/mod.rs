//! Page controllers and their route table.

use fourcut_router::Router;

use crate::AppContext;

mod about;
mod gallery;
mod home;
pub mod photo_booth;

/// Landing page; also the fallback for empty locations.
pub const HOME_ROUTE: &str = "/main";
/// Camera and upload flow.
pub const PHOTO_ROUTE: &str = "/photo";
/// Static about page.
pub const ABOUT_ROUTE: &str = "/about";
/// Persisted gallery viewer.
pub const GALLERY_ROUTE: &str = "/viewer";

/// Registers every page on `router`.
pub fn register_pages(router: &Router, context: &AppContext) {
    router.register(HOME_ROUTE, home::activate);
    router.register(ABOUT_ROUTE, about::activate);

    let photo_context = context.clone();
    router.register(PHOTO_ROUTE, move |page| {
        photo_booth::activate(photo_context.clone(), page)
    });

    let gallery_context = context.clone();
    router.register(GALLERY_ROUTE, move |page| {
        gallery::activate(&gallery_context, page)
    });
}
