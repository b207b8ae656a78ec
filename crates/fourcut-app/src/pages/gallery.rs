//! Read-only view over the persisted strips.

use std::rc::Rc;

use fourcut_router::{PageContext, Teardown};
use fourcut_ui::{UiAction, View};

use super::PHOTO_ROUTE;
use crate::AppContext;

pub(crate) fn activate(context: &AppContext, page: PageContext) -> Teardown {
    let entries = context.gallery.load_all().len();
    tracing::debug!(stage = "gallery", action = "show", entries);

    let PageContext {
        lease, navigator, ..
    } = page;
    lease.render(View::Gallery { entries });
    lease.set_action_handler(Rc::new(move |action| {
        if matches!(action, UiAction::Shoot | UiAction::Retake) {
            navigator.navigate(PHOTO_ROUTE);
        }
    }));
    Teardown::none()
}
