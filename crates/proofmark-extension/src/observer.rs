//! Debounced document rescans driven by a `MutationObserver`.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, MutationObserver, MutationObserverInit};

use proofmark_browser::PlatformError;

/// Delay between the last observed mutation and the rescan.
pub const RESCAN_DELAY_MS: u32 = 500;

/// Calls `on_rescan` once the document has been quiet for the delay.
/// Disconnects on drop.
pub struct RescanObserver {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
    pending: Rc<RefCell<Option<Timeout>>>,
}

impl RescanObserver {
    pub fn observe(
        document: &Document,
        delay_ms: u32,
        on_rescan: impl Fn() + 'static,
    ) -> Result<Self, PlatformError> {
        let root = document
            .body()
            .map(web_sys::Node::from)
            .or_else(|| document.document_element().map(web_sys::Node::from))
            .ok_or("document has nothing to observe")?;

        let on_rescan: Rc<dyn Fn()> = Rc::new(on_rescan);
        let pending: Rc<RefCell<Option<Timeout>>> = Rc::default();
        let slot = pending.clone();
        let callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)> =
            Closure::new(move |_records: js_sys::Array, _observer: MutationObserver| {
                let run = on_rescan.clone();
                let timer = Timeout::new(delay_ms, move || run());
                let previous = slot.borrow_mut().replace(timer);
                drop(previous);
            });

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| PlatformError::from(format!("MutationObserver failed: {e:?}")))?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer
            .observe_with_options(&root, &init)
            .map_err(|e| PlatformError::from(format!("observe failed: {e:?}")))?;

        tracing::debug!(target: "proofmark::observer", delay_ms, "watching for new regions");
        Ok(Self {
            observer,
            _callback: callback,
            pending,
        })
    }
}

impl Drop for RescanObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
        let pending = self.pending.borrow_mut().take();
        drop(pending);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use gloo_timers::future::TimeoutFuture;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    async fn test_bursts_of_mutations_rescan_once() {
        let document = web_sys::window().unwrap().document().unwrap();
        let body = document.body().unwrap();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let observer =
            RescanObserver::observe(&document, 30, move || seen.set(seen.get() + 1)).unwrap();

        for _ in 0..3 {
            let div = document.create_element("div").unwrap();
            body.append_child(&div).unwrap();
            div.remove();
        }
        TimeoutFuture::new(100).await;
        assert_eq!(count.get(), 1);

        drop(observer);
        body.append_child(&document.create_element("div").unwrap())
            .unwrap();
        TimeoutFuture::new(100).await;
        assert_eq!(count.get(), 1);
    }
}
