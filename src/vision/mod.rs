//! 영상 처리 기능(그레이 변환, 블러, 캐니, 확률적 허프 변환, 선 그리기)의 경계입니다.
//!
//! 실제 알고리즘은 외부 비전 라이브러리가 담당하고, 파이프라인은 `Vision` 트레이트를
//! 통해서만 호출합니다. 기본 구현은 `opencv` 기능의 [`opencv::OpenCv`]입니다.

#[cfg(feature = "opencv")]
pub mod opencv;

use crate::config::HoughConfig;
use crate::error::Result;
use crate::pipeline::TuningState;

/// 검출된 직선 선분 (x1, y1) - (x2, y2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl LineSegment {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

/// 확률적 허프 변환에 넘기는 파라미터. `theta`는 라디안 단위입니다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughParams {
    pub rho: f64,
    pub theta: f64,
    pub threshold: i32,
    pub min_line_length: f64,
    pub max_line_gap: f64,
}

impl HoughParams {
    /// 설정의 고정값과 실시간 투표 임계값을 합칩니다.
    /// 설정 파일의 `theta`(도)는 여기서 한 번만 라디안으로 바뀝니다.
    pub fn new(config: &HoughConfig, tuning: &TuningState) -> Self {
        Self {
            rho: config.rho,
            theta: config.theta.to_radians(),
            threshold: tuning.hough_threshold,
            min_line_length: config.min_line_length,
            max_line_gap: config.max_line_gap,
        }
    }
}

/// 선을 그릴 때의 색(BGR)과 두께
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub bgr: [f64; 3],
    pub thickness: i32,
}

/// 검출 결과를 원본 프레임에 그릴 때 쓰는 초록색 2px 선
pub const HIGHLIGHT: Stroke = Stroke {
    bgr: [0.0, 255.0, 0.0],
    thickness: 2,
};

/// 파이프라인이 사용하는 외부 비전 기능 집합.
///
/// `Frame`은 3채널 BGR 원본 프레임, `Image`는 단일 채널 중간 결과(그레이, 블러, 엣지)입니다.
pub trait Vision {
    type Frame;
    type Image;

    fn to_gray(&self, frame: &Self::Frame) -> Result<Self::Image>;

    /// 한 변이 `kernel`인 정사각 가우시안 블러. `kernel`은 양의 홀수입니다.
    fn gaussian_blur(&self, image: &Self::Image, kernel: i32) -> Result<Self::Image>;

    /// 이진(0/255) 엣지 맵을 반환합니다.
    fn canny(&self, image: &Self::Image, threshold1: f64, threshold2: f64) -> Result<Self::Image>;

    fn hough_lines_p(&self, edges: &Self::Image, params: &HoughParams) -> Result<Vec<LineSegment>>;

    fn draw_line(&self, frame: &mut Self::Frame, line: &LineSegment, stroke: &Stroke) -> Result<()>;
}
