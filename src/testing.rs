//! 단위 테스트용 가짜 비전/소스/디스플레이 구현

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::driver::{Display, FrameSource, Key, Release};
use crate::error::{Error, Result};
use crate::pipeline::TuningState;
use crate::vision::{HoughParams, LineSegment, Stroke, Vision};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FakeFrame {
    pub id: usize,
    pub overlays: Vec<(LineSegment, Stroke)>,
}

impl FakeFrame {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            overlays: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Gray(usize),
    Blur(i32),
    Canny(f64, f64),
    Hough(HoughParams),
    Draw(LineSegment),
}

/// 호출을 기록하고 미리 정해둔 선분을 돌려주는 비전 구현.
/// 중간 영상은 프레임 번호(`usize`)로 표현합니다.
pub(crate) struct FakeVision {
    lines: Vec<LineSegment>,
    fail_frames: Vec<usize>,
    calls: Rc<RefCell<Vec<Call>>>,
}

impl FakeVision {
    pub fn with_lines(lines: Vec<LineSegment>) -> Self {
        Self {
            lines,
            fail_frames: Vec::new(),
            calls: Rc::default(),
        }
    }

    /// 주어진 번호의 프레임은 그레이 변환에서 실패합니다.
    pub fn failing_on(mut self, frames: impl IntoIterator<Item = usize>) -> Self {
        self.fail_frames.extend(frames);
        self
    }

    pub fn calls(&self) -> Rc<RefCell<Vec<Call>>> {
        Rc::clone(&self.calls)
    }

    pub fn gray_calls(calls: &RefCell<Vec<Call>>) -> usize {
        calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::Gray(_)))
            .count()
    }
}

impl Vision for FakeVision {
    type Frame = FakeFrame;
    type Image = usize;

    fn to_gray(&self, frame: &FakeFrame) -> Result<usize> {
        self.calls.borrow_mut().push(Call::Gray(frame.id));
        if self.fail_frames.contains(&frame.id) {
            return Err(Error::Vision(format!("corrupt frame {}", frame.id)));
        }
        Ok(frame.id)
    }

    fn gaussian_blur(&self, image: &usize, kernel: i32) -> Result<usize> {
        self.calls.borrow_mut().push(Call::Blur(kernel));
        Ok(*image)
    }

    fn canny(&self, image: &usize, threshold1: f64, threshold2: f64) -> Result<usize> {
        self.calls.borrow_mut().push(Call::Canny(threshold1, threshold2));
        Ok(*image)
    }

    fn hough_lines_p(&self, _edges: &usize, params: &HoughParams) -> Result<Vec<LineSegment>> {
        self.calls.borrow_mut().push(Call::Hough(*params));
        Ok(self.lines.clone())
    }

    fn draw_line(&self, frame: &mut FakeFrame, line: &LineSegment, stroke: &Stroke) -> Result<()> {
        self.calls.borrow_mut().push(Call::Draw(*line));
        frame.overlays.push((*line, *stroke));
        Ok(())
    }
}

/// 유한한 프레임 목록을 내보내는 소스. `read_error_after`가 설정되면
/// 그 개수만큼 읽은 뒤 읽기 에러를 냅니다.
pub(crate) struct FakeSource {
    frames: VecDeque<FakeFrame>,
    read_error_after: Option<usize>,
    reads: usize,
    pub releases: Rc<Cell<usize>>,
}

impl FakeSource {
    pub fn with_frames(count: usize) -> Self {
        Self {
            frames: (0..count).map(FakeFrame::new).collect(),
            read_error_after: None,
            reads: 0,
            releases: Rc::default(),
        }
    }

    pub fn read_error_after(mut self, frames: usize) -> Self {
        self.read_error_after = Some(frames);
        self
    }
}

impl FrameSource for FakeSource {
    type Frame = FakeFrame;

    fn read(&mut self) -> Result<Option<FakeFrame>> {
        if self.read_error_after == Some(self.reads) {
            return Err(Error::FrameAcquisition("device unplugged".into()));
        }
        self.reads += 1;
        Ok(self.frames.pop_front())
    }
}

impl Release for FakeSource {
    fn release(&mut self) -> Result<()> {
        self.releases.set(self.releases.get() + 1);
        Ok(())
    }
}

/// 표시된 프레임과 엣지 맵을 기록하고, 미리 정해둔 키 입력을 돌려주는 디스플레이
#[derive(Default)]
pub(crate) struct FakeDisplay {
    pub shown: Vec<FakeFrame>,
    pub edges_shown: Vec<usize>,
    pub tuning: Option<TuningState>,
    pub tuning_reads: usize,
    /// `poll_key` 호출 순서대로 돌려줄 키. 비어 있으면 입력 없음.
    pub keys: VecDeque<Option<Key>>,
    pub waits: Vec<Option<u32>>,
    pub releases: usize,
    pub fail_show: bool,
}

impl Display for FakeDisplay {
    type Frame = FakeFrame;
    type Image = usize;

    fn show(&mut self, frame: &FakeFrame) -> Result<()> {
        if self.fail_show {
            return Err(Error::Display("window closed".into()));
        }
        self.shown.push(frame.clone());
        Ok(())
    }

    fn show_edges(&mut self, edges: &usize) -> Result<()> {
        self.edges_shown.push(*edges);
        Ok(())
    }

    fn tuning(&mut self, initial: &TuningState) -> Result<TuningState> {
        self.tuning_reads += 1;
        Ok(self.tuning.unwrap_or(*initial))
    }

    fn poll_key(&mut self, wait_ms: Option<u32>) -> Result<Option<Key>> {
        self.waits.push(wait_ms);
        Ok(self.keys.pop_front().flatten())
    }
}

impl Release for FakeDisplay {
    fn release(&mut self) -> Result<()> {
        self.releases += 1;
        Ok(())
    }
}
