use opencv::core::{Mat, Point, Scalar, CV_8UC3};
use opencv::imgproc;
use opencv::prelude::*;

/// Generates a uniform BGR frame.
pub fn uniform_bgr(width: i32, height: i32, value: f64) -> Mat {
    Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(value))
        .expect("failed to allocate frame")
}

/// Black frame with one white straight line from `from` to `to`.
pub fn single_line_bgr(
    width: i32,
    height: i32,
    from: (i32, i32),
    to: (i32, i32),
    thickness: i32,
) -> Mat {
    let mut frame = uniform_bgr(width, height, 0.0);
    imgproc::line(
        &mut frame,
        Point::new(from.0, from.1),
        Point::new(to.0, to.1),
        Scalar::all(255.0),
        thickness,
        imgproc::LINE_8,
        0,
    )
    .expect("failed to draw synthetic line");
    frame
}

pub fn bytes(frame: &Mat) -> Vec<u8> {
    frame.data_bytes().expect("frame is not continuous").to_vec()
}
