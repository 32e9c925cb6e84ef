//! Suspension points used by the playback loop.

use std::time::Duration;

/// Async timing capability for the playback loop.
///
/// The controller suspends only through this trait: between steps, while
/// polling a pause, and before a frame capture.
#[allow(async_fn_in_trait)]
pub trait Timer {
    /// Suspend for `duration`.
    async fn sleep(&self, duration: Duration);

    /// Suspend until the presentation has had a chance to paint the most
    /// recently published snapshot.
    async fn next_paint(&self) {}
}

/// Tokio-backed timer for native playback.
#[cfg(feature = "tokio")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioTimer;

#[cfg(feature = "tokio")]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn next_paint(&self) {
        tokio::task::yield_now().await;
    }
}

/// Browser timer using `setTimeout` and `requestAnimationFrame`.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use js_sys::{Function, Promise};
    use wasm_bindgen::JsValue;
    use wasm_bindgen_futures::JsFuture;

    /// Timer driven by the browser event loop.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct WebTimer;

    async fn wait_on(schedule: impl Fn(&web_sys::Window, &Function) -> bool) {
        let promise = Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window()
                .map(|window| schedule(&window, &resolve))
                .unwrap_or(false);
            if !scheduled {
                // No event loop to wait on; resolve right away.
                let _ = resolve.call0(&JsValue::NULL);
            }
        });
        let _ = JsFuture::from(promise).await;
    }

    impl Timer for WebTimer {
        async fn sleep(&self, duration: Duration) {
            let ms = duration.as_millis().min(i32::MAX as u128) as i32;
            wait_on(|window, resolve| {
                window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(resolve, ms)
                    .is_ok()
            })
            .await;
        }

        async fn next_paint(&self) {
            wait_on(|window, resolve| window.request_animation_frame(resolve).is_ok()).await;
        }
    }
}

#[cfg(all(test, feature = "tokio"))]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_timer_sleeps_virtual_time() {
        let start = tokio::time::Instant::now();
        TokioTimer.sleep(Duration::from_millis(150)).await;
        assert!(start.elapsed() >= Duration::from_millis(150));
    }
}
