// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use glam::DVec2;
use kurbo::{Line, Point};

pub(crate) fn point_to_dvec2(p: Point) -> DVec2 {
    DVec2::new(p.x, p.y)
}

pub(crate) fn line_endpoints(line: Line) -> (DVec2, DVec2) {
    (point_to_dvec2(line.p0), point_to_dvec2(line.p1))
}

pub(crate) fn line_is_finite(line: Line) -> bool {
    line.p0.is_finite() && line.p1.is_finite()
}
