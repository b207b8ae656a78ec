use fourcut_router::{PageContext, Teardown};
use fourcut_ui::View;

use crate::app_version;

pub(crate) fn activate(page: PageContext) -> Teardown {
    page.lease.render(View::About {
        version: app_version().to_string(),
    });
    Teardown::none()
}
