//! Bar-chart layout and rasterization for array snapshots.

use std::cell::RefCell;
use std::rc::Rc;

use crate::capture::{RgbaFrame, Viewport};
use crate::color::{Palette, Rgb};
use crate::error::CaptureError;
use crate::ArraySnapshot;

/// Configuration for rendering a snapshot.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Chart width in pixels
    pub width: u32,
    /// Chart height in pixels
    pub height: u32,
    /// Empty border around the bars in pixels
    pub padding: f64,
    /// Horizontal gap between adjacent bars in pixels
    pub gap: f64,
    /// Upper bound for a single bar's width in pixels
    pub max_bar_width: f64,
    /// Value drawn at full inner height
    pub value_scale: u32,
    /// Bar and background colors
    pub palette: Palette,
}

impl RenderConfig {
    /// Create a render config for a chart of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            padding: 16.0,
            gap: 2.0,
            max_bar_width: 60.0,
            value_scale: 100,
            palette: Palette::default(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new(800, 400)
    }
}

/// Result of laying out a snapshot.
///
/// This is a platform-agnostic list of rectangles; each consumer draws them
/// with its own backend.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Background color
    pub background: Rgb,
    /// One rectangle per bar, left to right
    pub bars: Vec<BarRect>,
}

/// A bar to be drawn, bottom-aligned.
#[derive(Clone, Debug, PartialEq)]
pub struct BarRect {
    /// Stable bar id
    pub id: usize,
    /// Bar value (for labels)
    pub value: u32,
    /// Left edge in pixels
    pub x: f64,
    /// Top edge in pixels
    pub y: f64,
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
    /// Fill color
    pub color: Rgb,
}

impl BarRect {
    /// Get the color as a CSS-compatible string "rgb(r,g,b)"
    pub fn color_string(&self) -> String {
        format!("rgb({},{},{})", self.color.0, self.color.1, self.color.2)
    }
}

/// Lay out a snapshot as a centered, bottom-aligned bar chart.
///
/// ## Example
///
/// ```rust
/// use sortviz_core::{ArraySnapshot, RenderConfig};
///
/// let snapshot = ArraySnapshot::from_values(&[50, 100]);
/// let result = sortviz_core::render::render_snapshot(&snapshot, &RenderConfig::new(200, 120));
///
/// assert_eq!(result.bars.len(), 2);
/// // The 100 bar spans the full inner height, the 50 bar half of it.
/// assert_eq!(result.bars[1].height, 2.0 * result.bars[0].height);
/// ```
pub fn render_snapshot(snapshot: &ArraySnapshot, config: &RenderConfig) -> RenderResult {
    let width = config.width as f64;
    let height = config.height as f64;
    let inner_w = (width - 2.0 * config.padding).max(0.0);
    let inner_h = (height - 2.0 * config.padding).max(0.0);
    let n = snapshot.len();

    let mut bars = Vec::with_capacity(n);
    if n > 0 {
        let gaps = config.gap * (n - 1) as f64;
        let bar_w = ((inner_w - gaps) / n as f64).clamp(0.0, config.max_bar_width);
        let used = bar_w * n as f64 + gaps;
        let left = config.padding + (inner_w - used).max(0.0) / 2.0;
        let bottom = config.padding + inner_h;
        let scale = config.value_scale.max(1) as f64;

        for (i, bar) in snapshot.bars().iter().enumerate() {
            let h = (bar.value as f64 / scale).min(1.0) * inner_h;
            bars.push(BarRect {
                id: bar.id,
                value: bar.value,
                x: left + i as f64 * (bar_w + config.gap),
                y: bottom - h,
                width: bar_w,
                height: h,
                color: config.palette.bar_color(bar.state),
            });
        }
    }

    RenderResult {
        width: config.width,
        height: config.height,
        background: config.palette.background,
        bars,
    }
}

/// Fill an RGBA buffer with the laid-out chart.
pub fn rasterize(result: &RenderResult) -> RgbaFrame {
    let mut frame = RgbaFrame::filled(result.width, result.height, result.background);
    let stride = result.width as usize * 4;

    for bar in &result.bars {
        let x0 = bar.x.round().max(0.0) as usize;
        let x1 = ((bar.x + bar.width).round().max(0.0) as usize).min(result.width as usize);
        let y0 = bar.y.round().max(0.0) as usize;
        let y1 = ((bar.y + bar.height).round().max(0.0) as usize).min(result.height as usize);
        let (r, g, b) = bar.color;

        for y in y0..y1 {
            for x in x0..x1 {
                let idx = y * stride + x * 4;
                frame.pixels[idx..idx + 4].copy_from_slice(&[r, g, b, 255]);
            }
        }
    }

    frame
}

/// Native viewport showing the latest published snapshot as a bar chart.
///
/// Cloning shares the displayed snapshot, so one clone can be handed to a
/// [`crate::RecordingCoordinator`] while another is attached to the
/// controller.
#[derive(Clone, Debug, Default)]
pub struct BarChartView {
    shown: Rc<RefCell<ArraySnapshot>>,
    config: RenderConfig,
}

impl BarChartView {
    /// Create an empty view.
    pub fn new(config: RenderConfig) -> Self {
        Self {
            shown: Rc::default(),
            config,
        }
    }

    /// Replace the displayed snapshot.
    pub fn show(&self, snapshot: &ArraySnapshot) {
        *self.shown.borrow_mut() = snapshot.clone();
    }

    /// The displayed snapshot.
    pub fn shown(&self) -> ArraySnapshot {
        self.shown.borrow().clone()
    }

    /// Keep this view in sync with every update the controller publishes.
    pub fn attach<T: crate::Timer>(&self, controller: &crate::PlaybackController<T>) {
        self.show(&controller.snapshot());
        let view = self.clone();
        controller.subscribe(move |update| view.show(&update.snapshot));
    }

    /// Render configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }
}

impl Viewport for BarChartView {
    fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn capture(&self) -> Result<RgbaFrame, CaptureError> {
        let result = render_snapshot(&self.shown.borrow(), &self.config);
        Ok(rasterize(&result))
    }
}

/// Web-specific rendering, capture and download support.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use crate::capture::ExportSink;
    use crate::error::ExportError;
    use std::time::Duration;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::{Blob, BlobPropertyBag, CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement, Url};

    fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, String> {
        canvas
            .get_context("2d")
            .map_err(|_| "Failed to get 2d context")?
            .ok_or("No 2d context available")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "Failed to cast to CanvasRenderingContext2d".to_string())
    }

    /// Render a snapshot directly to an HTML canvas.
    ///
    /// ## Example
    ///
    /// ```rust,ignore
    /// use sortviz_core::{ArraySnapshot, RenderConfig};
    /// use sortviz_core::render::web::render_to_canvas;
    ///
    /// let canvas: web_sys::HtmlCanvasElement = // ... get canvas element
    /// render_to_canvas(&snapshot, &canvas, &RenderConfig::new(800, 400))?;
    /// ```
    pub fn render_to_canvas(snapshot: &ArraySnapshot, canvas: &HtmlCanvasElement, config: &RenderConfig) -> Result<(), String> {
        let result = render_snapshot(snapshot, config);

        canvas.set_width(result.width);
        canvas.set_height(result.height);
        let ctx = context_2d(canvas)?;

        ctx.set_fill_style_str(&config.palette.background_css());
        ctx.fill_rect(0.0, 0.0, result.width as f64, result.height as f64);

        for bar in &result.bars {
            ctx.set_fill_style_str(&bar.color_string());
            ctx.fill_rect(bar.x, bar.y, bar.width, bar.height);
        }

        Ok(())
    }

    /// Viewport backed by a canvas element the presentation draws into.
    #[derive(Clone, Debug)]
    pub struct CanvasViewport {
        canvas: HtmlCanvasElement,
    }

    impl CanvasViewport {
        /// Capture from `canvas`.
        pub fn new(canvas: HtmlCanvasElement) -> Self {
            Self { canvas }
        }
    }

    impl Viewport for CanvasViewport {
        fn size(&self) -> (u32, u32) {
            (self.canvas.width(), self.canvas.height())
        }

        fn capture(&self) -> Result<RgbaFrame, CaptureError> {
            let (width, height) = self.size();
            let ctx = context_2d(&self.canvas).map_err(CaptureError::Viewport)?;
            let data = ctx
                .get_image_data(0.0, 0.0, width as f64, height as f64)
                .map_err(|e| CaptureError::Viewport(format!("{e:?}")))?;
            RgbaFrame::new(width, height, data.data().0)
        }
    }

    /// How long a download's object URL stays valid after the click.
    pub const OBJECT_URL_LIFETIME: Duration = Duration::from_secs(60);

    /// Saves artifacts by triggering a browser download.
    ///
    /// Each object URL stays valid for `url_lifetime` after the click and is
    /// then revoked from a timer.
    #[derive(Clone, Copy, Debug)]
    pub struct DownloadExport {
        url_lifetime: Duration,
    }

    impl Default for DownloadExport {
        fn default() -> Self {
            Self::new(OBJECT_URL_LIFETIME)
        }
    }

    impl DownloadExport {
        /// Keep each object URL alive for `url_lifetime` after the click.
        pub fn new(url_lifetime: Duration) -> Self {
            Self { url_lifetime }
        }

        /// Delay before the object URL is revoked.
        pub fn url_lifetime(&self) -> Duration {
            self.url_lifetime
        }

        fn revoke_later(&self, window: &web_sys::Window, url: String) {
            let revoke = Closure::once_into_js(move || {
                let _ = Url::revoke_object_url(&url);
            });
            let ms = self.url_lifetime.as_millis().min(i32::MAX as u128) as i32;
            if window
                .set_timeout_with_callback_and_timeout_and_arguments_0(revoke.unchecked_ref(), ms)
                .is_err()
            {
                tracing::debug!("could not schedule object url revocation");
            }
        }
    }

    impl ExportSink for DownloadExport {
        fn save(&mut self, artifact: &[u8], suggested_filename: &str) -> Result<(), ExportError> {
            let unavailable = |what: &str| ExportError::Unavailable(what.to_string());
            let window = web_sys::window().ok_or_else(|| unavailable("no window"))?;
            let document = window.document().ok_or_else(|| unavailable("no document"))?;

            let bytes = js_sys::Uint8Array::from(artifact);
            let parts = js_sys::Array::of1(&bytes);
            let options = BlobPropertyBag::new();
            options.set_type("image/gif");
            let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
                .map_err(|_| unavailable("failed to create blob"))?;
            let url = Url::create_object_url_with_blob(&blob)
                .map_err(|_| unavailable("failed to create object url"))?;

            let anchor = document
                .create_element("a")
                .map_err(|_| unavailable("failed to create anchor"))?
                .dyn_into::<HtmlAnchorElement>()
                .map_err(|_| unavailable("failed to cast anchor"))?;
            anchor.set_href(&url);
            anchor.set_download(suggested_filename);
            anchor.click();

            self.revoke_later(&window, url);
            Ok(())
        }
    }
}
