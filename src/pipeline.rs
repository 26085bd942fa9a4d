use tracing::debug;

use crate::config::{HoughConfig, ValidConfig};
use crate::error::{Error, Result};
use crate::vision::{HoughParams, LineSegment, Stroke, Vision, HIGHLIGHT};

/// 트랙바로 실시간 조절되는 파라미터.
/// 설정 파일 값으로 시작해 매 프레임 UI에서 다시 읽어옵니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuningState {
    pub canny_threshold1: i32,
    pub canny_threshold2: i32,
    pub hough_threshold: i32,
}

/// 한 프레임 처리 결과: 검출된 선분들과 (표시용) 엣지 맵
#[derive(Debug)]
pub struct Detection<I> {
    pub lines: Vec<LineSegment>,
    pub edges: I,
}

/// 단일 프레임에 대해 선 검출을 수행하고 결과를 원본 프레임 위에 그리는 파이프라인입니다.
///
/// 프레임 사이에 상태를 유지하지 않으므로, 같은 프레임과 파라미터로 두 번 실행하면
/// 같은 결과가 나옵니다.
pub struct FramePipeline<V> {
    vision: V,
    hough: HoughConfig,
    stroke: Stroke,
}

impl<V: Vision> FramePipeline<V> {
    pub fn new(vision: V, config: &ValidConfig) -> Self {
        Self {
            vision,
            hough: config.hough.clone(),
            stroke: HIGHLIGHT,
        }
    }

    pub fn vision(&self) -> &V {
        &self.vision
    }

    /// 단일 프레임 처리 과정입니다.
    ///
    /// 1) 그레이 변환
    /// 2) `blur_kernel` 크기의 가우시안 블러
    /// 3) 실시간 임계값으로 캐니 엣지
    /// 4) 엣지 맵에 확률적 허프 변환
    /// 5) 검출된 선분을 **원본** 프레임에 그리기
    ///
    /// # 인자
    /// * `frame` - BGR 원본 프레임. 선분이 제자리에서 그려집니다.
    /// * `tuning` - 현재 트랙바 값
    /// * `blur_kernel` - 블러 커널 크기 (양의 홀수)
    ///
    /// # 반환
    /// * 검출된 선분과 엣지 맵. 선분이 없으면 프레임은 그대로입니다.
    ///
    /// # 에러
    /// * `blur_kernel`이 짝수이거나 0 이하이면 아무것도 하지 않고 `InvalidKernelSize`
    pub fn process(
        &self,
        frame: &mut V::Frame,
        tuning: &TuningState,
        blur_kernel: i32,
    ) -> Result<Detection<V::Image>> {
        if blur_kernel <= 0 || blur_kernel % 2 == 0 {
            return Err(Error::InvalidKernelSize(blur_kernel));
        }

        let gray = self.vision.to_gray(frame)?;
        let blurred = self.vision.gaussian_blur(&gray, blur_kernel)?;
        let edges = self.vision.canny(
            &blurred,
            f64::from(tuning.canny_threshold1),
            f64::from(tuning.canny_threshold2),
        )?;

        let params = HoughParams::new(&self.hough, tuning);
        let lines = self.vision.hough_lines_p(&edges, &params)?;
        debug!(lines = lines.len(), ?tuning, "frame processed");

        for line in &lines {
            self.vision.draw_line(frame, line, &self.stroke)?;
        }

        Ok(Detection { lines, edges })
    }
}
