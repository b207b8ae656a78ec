use std::rc::Rc;

use fourcut_router::{PageContext, Teardown};
use fourcut_ui::{UiAction, View};

use super::PHOTO_ROUTE;
use crate::app_version;

pub(crate) fn activate(page: PageContext) -> Teardown {
    let PageContext {
        lease, navigator, ..
    } = page;

    lease.render(View::Home {
        version: app_version().to_string(),
    });
    lease.set_action_handler(Rc::new(move |action| match action {
        UiAction::Shoot => navigator.navigate(PHOTO_ROUTE),
        other => tracing::debug!(stage = "home", action = "ignored", input = ?other),
    }));

    // Owns nothing beyond the handler, which the surface drops on clear.
    Teardown::none()
}
