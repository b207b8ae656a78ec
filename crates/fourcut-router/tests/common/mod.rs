//! Shared fixtures for router integration tests.

use std::cell::RefCell;
use std::rc::Rc;

use fourcut_router::{PageContext, Router, Teardown};
use fourcut_ui::View;

/// Ordered record of activations and teardowns.
pub type Journal = Rc<RefCell<Vec<String>>>;

/// Creates an empty journal.
pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Registers a page at `path` that journals `activate <name>` and
/// `teardown <name>` and renders a loading view carrying its name.
pub fn register_probe(router: &Router, path: &str, name: &'static str, journal: &Journal) {
    let journal = Rc::clone(journal);
    router.register(path, move |context: PageContext| {
        journal.borrow_mut().push(format!("activate {name}"));
        context.lease.render(View::Loading {
            message: name.to_string(),
        });

        let journal = Rc::clone(&journal);
        Teardown::new(move || journal.borrow_mut().push(format!("teardown {name}")))
    });
}

/// Snapshot of the journal.
#[allow(dead_code)]
pub fn entries(journal: &Journal) -> Vec<String> {
    journal.borrow().clone()
}
