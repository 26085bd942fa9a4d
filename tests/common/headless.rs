use std::cell::Cell;

use line_tuner::driver::{Display, Key, Release};
use line_tuner::pipeline::TuningState;
use line_tuner::vision::opencv::OpenCv;
use line_tuner::vision::{HoughParams, LineSegment, Stroke, Vision};
use line_tuner::Result;
use opencv::core::Mat;

/// Display without windows: counts frames and never reports a key press.
#[derive(Default)]
pub struct Headless {
    pub shown: usize,
    pub releases: usize,
}

impl Display for Headless {
    type Frame = Mat;
    type Image = Mat;

    fn show(&mut self, _frame: &Mat) -> Result<()> {
        self.shown += 1;
        Ok(())
    }

    fn tuning(&mut self, initial: &TuningState) -> Result<TuningState> {
        Ok(*initial)
    }

    fn poll_key(&mut self, _wait_ms: Option<u32>) -> Result<Option<Key>> {
        Ok(None)
    }
}

impl Release for Headless {
    fn release(&mut self) -> Result<()> {
        self.releases += 1;
        Ok(())
    }
}

/// OpenCV vision that counts how many frames entered the pipeline.
#[derive(Default)]
pub struct Counting {
    inner: OpenCv,
    pub frames: Cell<usize>,
}

impl Vision for Counting {
    type Frame = Mat;
    type Image = Mat;

    fn to_gray(&self, frame: &Mat) -> Result<Mat> {
        self.frames.set(self.frames.get() + 1);
        self.inner.to_gray(frame)
    }

    fn gaussian_blur(&self, image: &Mat, kernel: i32) -> Result<Mat> {
        self.inner.gaussian_blur(image, kernel)
    }

    fn canny(&self, image: &Mat, threshold1: f64, threshold2: f64) -> Result<Mat> {
        self.inner.canny(image, threshold1, threshold2)
    }

    fn hough_lines_p(&self, edges: &Mat, params: &HoughParams) -> Result<Vec<LineSegment>> {
        self.inner.hough_lines_p(edges, params)
    }

    fn draw_line(&self, frame: &mut Mat, line: &LineSegment, stroke: &Stroke) -> Result<()> {
        self.inner.draw_line(frame, line, stroke)
    }
}
