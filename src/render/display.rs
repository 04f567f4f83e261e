use crate::backend::ActiveTarget;
use crate::foundation::core::{PixelPoint, PixelRect};
use kurbo::Size;

/// How logical content is mapped into the fixed-resolution output surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMode {
    /// Fill the whole output, ignoring the content's aspect ratio.
    #[default]
    Stretch,
    /// Largest centred area with the content's aspect ratio; the rest is letterboxed.
    AspectFit,
}

/// Output-space rectangles for each source layer, recomputed on every reflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayAreas {
    /// Whole output surface.
    pub output: PixelRect,
    /// Where the game surface lands.
    pub game: PixelRect,
    /// Where the overlay lands.
    pub overlay: PixelRect,
}

impl DisplayAreas {
    /// Areas for an output of `width x height`, every layer covering all of it.
    pub fn new(width: u32, height: u32) -> Self {
        let output = PixelRect::from_size(width, height);
        Self {
            output,
            game: output,
            overlay: output,
        }
    }

    /// Recompute layer areas from their draw rectangles.
    pub(crate) fn recalculate(
        &mut self,
        mode: ScalingMode,
        game_draw: PixelRect,
        overlay_draw: PixelRect,
    ) {
        self.game = fit_area(self.output, game_draw, mode);
        self.overlay = fit_area(self.output, overlay_draw, mode);
    }

    /// Area of the given layer.
    pub fn area_for(&self, target: ActiveTarget) -> PixelRect {
        match target {
            ActiveTarget::Game => self.game,
            ActiveTarget::Overlay => self.overlay,
        }
    }
}

fn fit_area(output: PixelRect, content: PixelRect, mode: ScalingMode) -> PixelRect {
    if content.is_empty() || output.is_empty() {
        return output;
    }
    match mode {
        ScalingMode::Stretch => output,
        ScalingMode::AspectFit => {
            let out = output.to_rect();
            let (cw, ch) = (f64::from(content.width), f64::from(content.height));
            let scale = (out.width() / cw).min(out.height() / ch);
            let fitted =
                kurbo::Rect::from_center_size(out.center(), Size::new(cw * scale, ch * scale));
            PixelRect::from_rect_rounded(fitted)
        }
    }
}

/// Map an output-space point into the logical space of a layer drawn from `draw` onto `area`.
///
/// Points outside `area` are clamped to the nearest logical pixel.
pub fn output_to_logical(area: PixelRect, draw: PixelRect, p: PixelPoint) -> PixelPoint {
    if area.is_empty() || draw.is_empty() {
        return PixelPoint::new(0, 0);
    }
    let axis = |v: i32, a0: i32, alen: u32, d0: i32, dlen: u32| -> i32 {
        let off = (i64::from(v) - i64::from(a0)).clamp(0, i64::from(alen) - 1);
        (i64::from(d0) + off * i64::from(dlen) / i64::from(alen)) as i32
    };
    PixelPoint::new(
        axis(p.x, area.x, area.width, draw.x, draw.width),
        axis(p.y, area.y, area.height, draw.y, draw.height),
    )
}

/// Map a logical point of a layer drawn from `draw` onto `area` into output space.
pub fn logical_to_output(area: PixelRect, draw: PixelRect, p: PixelPoint) -> PixelPoint {
    if area.is_empty() || draw.is_empty() {
        return PixelPoint::new(area.x, area.y);
    }
    let axis = |v: i32, d0: i32, dlen: u32, a0: i32, alen: u32| -> i32 {
        let off = i64::from(v) - i64::from(d0);
        (i64::from(a0) + off * i64::from(alen) / i64::from(dlen)) as i32
    };
    PixelPoint::new(
        axis(p.x, draw.x, draw.width, area.x, area.width),
        axis(p.y, draw.y, draw.height, area.y, area.height),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/display.rs"]
mod tests;
