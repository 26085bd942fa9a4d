//! OpenCV 바인딩(`opencv` crate)으로 구현한 비전 기능, 프레임 소스, highgui 화면

use opencv::{
    core::{self, Mat, Point, Scalar, Size, Vec4i, Vector},
    highgui,
    imgcodecs,
    imgproc,
    prelude::*,
    videoio,
};
use opencv::core::AlgorithmHint::ALGO_HINT_DEFAULT;
use tracing::debug;

use crate::config::{InputConfig, SourceType, HOUGH_THRESHOLD_MAX};
use crate::driver::{Display, FrameSource, Key, Release};
use crate::error::{Error, Result};
use crate::pipeline::TuningState;
use crate::vision::{HoughParams, LineSegment, Stroke, Vision};

/// 결과 영상 창
pub const OUTPUT_WINDOW: &str = "Output";
/// 트랙바 창
pub const PARAMETER_WINDOW: &str = "Parameters";
/// 엣지 맵 창
pub const EDGES_WINDOW: &str = "Edges";

const CANNY_THRESH1: &str = "Canny Thresh1";
const CANNY_THRESH2: &str = "Canny Thresh2";
const HOUGH_THRESH: &str = "Hough Thresh";

/// OpenCV `imgproc` 함수들로 `Vision`을 구현합니다. 상태가 없는 단위 구조체입니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCv;

impl Vision for OpenCv {
    type Frame = Mat;
    type Image = Mat;

    /// BGR 영상을 그레이스케일로 변환합니다.
    fn to_gray(&self, frame: &Mat) -> Result<Mat> {
        let mut gray = Mat::default();
        imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0, ALGO_HINT_DEFAULT)?;
        Ok(gray)
    }

    /// 가우시안 블러로 노이즈를 줄입니다. 시그마는 커널 크기에서 계산되도록 0을 넘깁니다.
    fn gaussian_blur(&self, image: &Mat, kernel: i32) -> Result<Mat> {
        let mut dst = Mat::default();
        imgproc::gaussian_blur(
            image,
            &mut dst,
            Size::new(kernel, kernel),
            0.0,
            0.0,
            core::BORDER_DEFAULT,
            ALGO_HINT_DEFAULT,
        )?;
        Ok(dst)
    }

    /// 캐니 엣지 검출 (aperture 3, L1 gradient)
    fn canny(&self, image: &Mat, threshold1: f64, threshold2: f64) -> Result<Mat> {
        let mut edges = Mat::default();
        imgproc::canny(image, &mut edges, threshold1, threshold2, 3, false)?;
        Ok(edges)
    }

    fn hough_lines_p(&self, edges: &Mat, params: &HoughParams) -> Result<Vec<LineSegment>> {
        let mut lines: Vector<Vec4i> = Vector::new();
        imgproc::hough_lines_p(
            edges,
            &mut lines,
            params.rho,
            params.theta,
            params.threshold,
            params.min_line_length,
            params.max_line_gap,
        )?;
        Ok(lines
            .iter()
            .map(|l| LineSegment::new(l[0], l[1], l[2], l[3]))
            .collect())
    }

    fn draw_line(&self, frame: &mut Mat, line: &LineSegment, stroke: &Stroke) -> Result<()> {
        let [b, g, r] = stroke.bgr;
        imgproc::line(
            frame,
            Point::new(line.x1, line.y1),
            Point::new(line.x2, line.y2),
            Scalar::new(b, g, r, 0.0),
            stroke.thickness,
            imgproc::LINE_8,
            0,
        )?;
        Ok(())
    }
}

/// 설정의 `input.source_type`에 따라 여는 프레임 소스
pub enum OpenCvSource {
    /// 단일 이미지. 한 번 읽으면 비워집니다.
    Still(Option<Mat>),
    /// 동영상 파일 또는 웹캠
    Capture(videoio::VideoCapture),
}

impl OpenCvSource {
    /// 입력 설정으로 소스를 엽니다.
    ///
    /// # 에러
    /// * 파일이 없거나 카메라를 열 수 없으면 `SourceUnavailable`
    pub fn open(input: &InputConfig) -> Result<Self> {
        match input.source_type {
            SourceType::Image => {
                let image = imgcodecs::imread(&input.path, imgcodecs::IMREAD_COLOR)?;
                if image.empty() {
                    return Err(Error::SourceUnavailable(input.path.clone()));
                }
                Ok(Self::Still(Some(image)))
            }
            SourceType::VideoFile => {
                let cap = videoio::VideoCapture::from_file(&input.path, videoio::CAP_ANY)?;
                Self::opened(cap, || input.path.clone())
            }
            SourceType::Webcam => {
                let cap = videoio::VideoCapture::new(input.device, videoio::CAP_ANY)?;
                Self::opened(cap, || format!("camera #{}", input.device))
            }
        }
    }

    fn opened(cap: videoio::VideoCapture, describe: impl FnOnce() -> String) -> Result<Self> {
        if cap.is_opened()? {
            Ok(Self::Capture(cap))
        } else {
            Err(Error::SourceUnavailable(describe()))
        }
    }
}

impl FrameSource for OpenCvSource {
    type Frame = Mat;

    fn read(&mut self) -> Result<Option<Mat>> {
        match self {
            Self::Still(image) => Ok(image.take()),
            Self::Capture(cap) => {
                let mut frame = Mat::default();
                match cap.read(&mut frame) {
                    Ok(true) if !frame.empty() => Ok(Some(frame)),
                    // 더 이상 프레임이 없음
                    Ok(_) => Ok(None),
                    Err(err) => Err(Error::FrameAcquisition(err.to_string())),
                }
            }
        }
    }
}

impl Release for OpenCvSource {
    fn release(&mut self) -> Result<()> {
        match self {
            Self::Still(image) => {
                *image = None;
                Ok(())
            }
            Self::Capture(cap) => {
                debug!("releasing video capture");
                cap.release()?;
                Ok(())
            }
        }
    }
}

/// highgui 창과 트랙바로 구현한 화면
pub struct HighGui {
    trackbars: bool,
}

impl HighGui {
    /// 결과 창을 만들고, `trackbars`가 켜져 있으면 파라미터 창에
    /// 캐니 임계값 두 개(0~255)와 허프 임계값(1~500) 트랙바를 `initial` 위치로 만듭니다.
    pub fn new(initial: &TuningState, trackbars: bool, show_edges: bool) -> Result<Self> {
        highgui::named_window(OUTPUT_WINDOW, highgui::WINDOW_AUTOSIZE)?;
        if show_edges {
            highgui::named_window(EDGES_WINDOW, highgui::WINDOW_AUTOSIZE)?;
        }
        if trackbars {
            highgui::named_window(PARAMETER_WINDOW, highgui::WINDOW_AUTOSIZE)?;
            for (name, max, value) in [
                (CANNY_THRESH1, 255, initial.canny_threshold1),
                (CANNY_THRESH2, 255, initial.canny_threshold2),
                (HOUGH_THRESH, HOUGH_THRESHOLD_MAX, initial.hough_threshold),
            ] {
                highgui::create_trackbar(name, PARAMETER_WINDOW, None, max, None)?;
                highgui::set_trackbar_pos(name, PARAMETER_WINDOW, value)?;
            }
            // 투표 임계값 0은 HoughLinesP가 받지 않음
            highgui::set_trackbar_min(HOUGH_THRESH, PARAMETER_WINDOW, 1)?;
        }
        Ok(Self { trackbars })
    }
}

impl Display for HighGui {
    type Frame = Mat;
    type Image = Mat;

    fn show(&mut self, frame: &Mat) -> Result<()> {
        highgui::imshow(OUTPUT_WINDOW, frame)?;
        Ok(())
    }

    fn show_edges(&mut self, edges: &Mat) -> Result<()> {
        highgui::imshow(EDGES_WINDOW, edges)?;
        Ok(())
    }

    fn tuning(&mut self, initial: &TuningState) -> Result<TuningState> {
        if !self.trackbars {
            return Ok(*initial);
        }
        Ok(TuningState {
            canny_threshold1: highgui::get_trackbar_pos(CANNY_THRESH1, PARAMETER_WINDOW)?,
            canny_threshold2: highgui::get_trackbar_pos(CANNY_THRESH2, PARAMETER_WINDOW)?,
            hough_threshold: highgui::get_trackbar_pos(HOUGH_THRESH, PARAMETER_WINDOW)?,
        })
    }

    fn poll_key(&mut self, wait_ms: Option<u32>) -> Result<Option<Key>> {
        // wait_key(0)은 무한 대기
        let delay = wait_ms.map_or(0, |ms| ms.clamp(1, i32::MAX as u32) as i32);
        let key = highgui::wait_key(delay)?;
        Ok((key >= 0).then_some(key & 0xFF))
    }
}

impl Release for HighGui {
    fn release(&mut self) -> Result<()> {
        highgui::destroy_all_windows()?;
        Ok(())
    }
}
