//! The demo cycle advanced by taps

use std::fmt;

use scene_kit::foundation::math::Vec3;
use serde::{Deserialize, Serialize};

/// One of the example scenes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Demo {
    /// Vertex-colored spinning cube
    #[default]
    SingleCube,
    /// The same cube with the bricks texture
    SingleCubeTextured,
    /// A cube showing a looping video stream
    SingleCubeVideo,
    /// 100 small cubes in a spinning container
    MultipleCubesFew,
    /// 10,000 smaller cubes in a spinning container
    MultipleCubesMany,
    /// Imported bunny mesh
    Bunny,
}

impl Demo {
    /// Every demo in tap order
    pub const ALL: [Demo; 6] = [
        Demo::SingleCube,
        Demo::SingleCubeTextured,
        Demo::SingleCubeVideo,
        Demo::MultipleCubesFew,
        Demo::MultipleCubesMany,
        Demo::Bunny,
    ];

    /// Demo shown after the next tap
    pub fn next(self) -> Self {
        match self {
            Demo::SingleCube => Demo::SingleCubeTextured,
            Demo::SingleCubeTextured => Demo::SingleCubeVideo,
            Demo::SingleCubeVideo => Demo::MultipleCubesFew,
            Demo::MultipleCubesFew => Demo::MultipleCubesMany,
            Demo::MultipleCubesMany => Demo::Bunny,
            Demo::Bunny => Demo::SingleCube,
        }
    }

    /// Camera position applied when the demo is shown; `None` keeps the current one
    pub fn camera_origin(self) -> Option<Vec3> {
        match self {
            Demo::SingleCube | Demo::SingleCubeTextured => None,
            Demo::SingleCubeVideo | Demo::MultipleCubesFew | Demo::MultipleCubesMany => {
                Some(Vec3::new(0.0, 0.0, 7.0))
            }
            Demo::Bunny => Some(Vec3::new(0.0, 0.0, 5.0)),
        }
    }
}

impl fmt::Display for Demo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Demo::SingleCube => "single cube",
            Demo::SingleCubeTextured => "textured cube",
            Demo::SingleCubeVideo => "video cube",
            Demo::MultipleCubesFew => "100 cubes",
            Demo::MultipleCubesMany => "10,000 cubes",
            Demo::Bunny => "bunny",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_visits_every_demo_and_wraps() {
        let mut demo = Demo::SingleCube;
        let mut visited = Vec::new();
        for _ in 0..Demo::ALL.len() {
            visited.push(demo);
            demo = demo.next();
        }
        assert_eq!(visited, Demo::ALL);
        assert_eq!(demo, Demo::SingleCube);
    }

    #[test]
    fn test_camera_origins() {
        assert_eq!(Demo::SingleCube.camera_origin(), None);
        assert_eq!(Demo::SingleCubeVideo.camera_origin(), Some(Vec3::new(0.0, 0.0, 7.0)));
        assert_eq!(Demo::MultipleCubesMany.camera_origin(), Some(Vec3::new(0.0, 0.0, 7.0)));
        assert_eq!(Demo::Bunny.camera_origin(), Some(Vec3::new(0.0, 0.0, 5.0)));
    }
}
