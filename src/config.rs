//! YAML 파라미터 파일(`config/params.yaml`)을 타입이 있는 구조체로 읽고 검증합니다.
//!
//! ```yaml
//! input:
//!   path: "data/road.mp4"
//!   source_type: video_file   # image | video_file | webcam
//! canny:
//!   threshold1: 50
//!   threshold2: 150
//!   blur_kernel: 5
//! hough:
//!   rho: 1
//!   theta: 1          # degrees
//!   threshold: 50
//!   min_line_length: 100
//!   max_line_gap: 10
//! ```

use std::fs;
use std::ops::Deref;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::pipeline::TuningState;

/// 프로그램 인자가 없을 때 사용하는 설정 파일 경로
pub const DEFAULT_CONFIG_PATH: &str = "config/params.yaml";

/// 허프 투표 임계값 상한. 트랙바 최대값과 같습니다.
pub const HOUGH_THRESHOLD_MAX: i32 = 500;

/// `hough.theta` 상한 (도). 이보다 크면 각도 구간이 하나도 생기지 않습니다.
pub const HOUGH_THETA_MAX_DEG: f64 = 180.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub input: InputConfig,
    pub canny: CannyConfig,
    pub hough: HoughConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    /// 이미지/동영상 파일 경로. 웹캠 모드에서는 비워둡니다.
    #[serde(default)]
    pub path: String,
    pub source_type: SourceType,
    /// 웹캠 모드에서 여는 카메라 번호
    #[serde(default)]
    pub device: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Image,
    VideoFile,
    Webcam,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CannyConfig {
    pub threshold1: i32,
    pub threshold2: i32,
    pub blur_kernel: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HoughConfig {
    pub rho: f64,
    /// 각도 해상도 (도 단위). 라디안 변환은 `HoughParams::new`에서 한 번만 수행합니다.
    pub theta: f64,
    pub threshold: i32,
    pub min_line_length: f64,
    pub max_line_gap: f64,
}

impl Config {
    /// 파일에서 설정을 읽어옵니다.
    ///
    /// # 에러
    /// * 파일을 읽을 수 없으면 `ConfigNotFound`
    /// * YAML 형식이나 스키마가 맞지 않으면 `ConfigParse`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| Error::ConfigNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        // UTF-8이 아닌 내용도 파싱 에러로 보고
        Self::parse(&data, &path.display().to_string())
    }

    /// 문자열로 주어진 YAML 설정을 파싱합니다.
    pub fn from_yaml_str(data: &str) -> Result<Self> {
        Self::parse(data.as_bytes(), "<inline>")
    }

    fn parse(data: &[u8], origin: &str) -> Result<Self> {
        serde_yaml::from_slice(data).map_err(|source| Error::ConfigParse {
            origin: origin.to_string(),
            source,
        })
    }

    /// 처리 전에 반드시 통과해야 하는 제약 조건을 검사합니다.
    /// 값을 보정하지 않고, 처음 발견한 위반 필드를 `ConfigInvalid`로 보고합니다.
    pub fn validate(&self) -> Result<()> {
        let canny = &self.canny;
        for (field, value) in [
            ("canny.threshold1", canny.threshold1),
            ("canny.threshold2", canny.threshold2),
        ] {
            if !(0..=255).contains(&value) {
                return Err(invalid(field, format!("must be within 0..=255, got {value}")));
            }
        }
        if canny.threshold1 >= canny.threshold2 {
            return Err(invalid(
                "canny.threshold1",
                format!(
                    "must be < canny.threshold2 ({} >= {})",
                    canny.threshold1, canny.threshold2
                ),
            ));
        }
        if canny.blur_kernel % 2 == 0 {
            return Err(invalid(
                "canny.blur_kernel",
                format!("must be odd, got {}", canny.blur_kernel),
            ));
        }
        if canny.blur_kernel <= 0 {
            return Err(invalid(
                "canny.blur_kernel",
                format!("must be positive, got {}", canny.blur_kernel),
            ));
        }

        let hough = &self.hough;
        if !(hough.rho > 0.0) {
            return Err(invalid("hough.rho", format!("must be positive, got {}", hough.rho)));
        }
        if !(hough.theta > 0.0 && hough.theta <= HOUGH_THETA_MAX_DEG) {
            return Err(invalid(
                "hough.theta",
                format!(
                    "must be within (0, {HOUGH_THETA_MAX_DEG}] degrees, got {}",
                    hough.theta
                ),
            ));
        }
        if !(1..=HOUGH_THRESHOLD_MAX).contains(&hough.threshold) {
            return Err(invalid(
                "hough.threshold",
                format!(
                    "must be within 1..={HOUGH_THRESHOLD_MAX}, got {}",
                    hough.threshold
                ),
            ));
        }
        if !(hough.min_line_length >= 0.0) {
            return Err(invalid(
                "hough.min_line_length",
                format!("must not be negative, got {}", hough.min_line_length),
            ));
        }
        if !(hough.max_line_gap >= 0.0) {
            return Err(invalid(
                "hough.max_line_gap",
                format!("must not be negative, got {}", hough.max_line_gap),
            ));
        }
        Ok(())
    }

    /// `validate`를 통과한 설정만 `ValidConfig`로 감쌉니다.
    pub fn validated(self) -> Result<ValidConfig> {
        self.validate()?;
        Ok(ValidConfig(self))
    }

    /// 설정 파일 값으로 초기 튜닝 상태를 만듭니다.
    pub fn tuning(&self) -> TuningState {
        TuningState {
            canny_threshold1: self.canny.threshold1,
            canny_threshold2: self.canny.threshold2,
            hough_threshold: self.hough.threshold,
        }
    }
}

fn invalid(field: &'static str, reason: String) -> Error {
    Error::ConfigInvalid { field, reason }
}

/// 검증을 통과한 설정. `Config::validated`로만 만들 수 있으며,
/// 파이프라인과 드라이버는 이 타입만 받습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidConfig(Config);

impl Deref for ValidConfig {
    type Target = Config;

    fn deref(&self) -> &Config {
        &self.0
    }
}
