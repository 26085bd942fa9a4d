use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use line_tuner::config::{Config, SourceType, DEFAULT_CONFIG_PATH};
use line_tuner::driver::{DriverOptions, StopReason, StreamDriver};
use line_tuner::telemetry;
use line_tuner::vision::opencv::{HighGui, OpenCv, OpenCvSource};

// 명령행 인자: 설정 파일 경로, 엣지 창 표시 여부, 상세 로그
/// Tunable Canny + Hough line detection over images, video files and webcams
#[derive(Debug, Parser)]
#[command(name = "line_tuner", version, about)]
struct Cli {
    /// Path to the YAML parameter file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Also show the Canny edge map in an "Edges" window
    #[arg(long = "show-edges", action = clap::ArgAction::SetTrue)]
    show_edges: bool,
    /// Enable debug logging (per-frame line counts)
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    verbose: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // 로그 구독자 설치 (RUST_LOG 우선)
    telemetry::init(cli.verbose);

    // 설정 읽기 + 검증. 실패하면 프레임을 건드리기 전에 종료

    let config = Config::load(&cli.config)
        .and_then(Config::validated)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // 트랙바는 동영상/웹캠 모드에서만 사용
    let trackbars = config.input.source_type != SourceType::Image;
    let display = HighGui::new(&config.tuning(), trackbars, cli.show_edges)
        .context("creating display windows")?;

    let options = DriverOptions {
        show_edges: cli.show_edges,
        ..DriverOptions::default()
    };
    // 드라이버 생성 후 소스를 열어 루프 실행
    let mut driver = StreamDriver::new(config, OpenCv, display, options);
    let summary = driver.run(OpenCvSource::open)?;

    // 읽기 에러로 끝난 경우는 0이 아닌 종료 코드
    if let StopReason::ReadError(reason) = &summary.stop {
        bail!(
            "stream stopped by a read error after {} frames: {reason}",
            summary.frames_read
        );
    }
    info!(
        frames = summary.frames_read,
        annotated = summary.frames_annotated,
        failed = summary.frames_failed,
        segments = summary.segments,
        "done"
    );
    Ok(())
}
