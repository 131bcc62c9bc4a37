use kurbo::BezPath;
use libtest_mimic::{Arguments, Failed, Trial};
use polycross::{find_intersections, find_intersections_with_eps, sweep::brute_force, Segments};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

type Coords = (f64, f64);

#[derive(Serialize, Deserialize, Debug)]
enum Assertion {
    /// Just check that the sweep succeeds, and agrees with the brute-force search.
    NoPanic,
    /// Check for exactly these pairs, given as indices in the order the
    /// segments were added.
    Pairs(Vec<(usize, usize)>),
}

#[derive(Serialize, Deserialize, Debug)]
struct RegressionCaseDeclaration {
    #[serde(default)]
    svg_path: Option<String>,
    #[serde(default)]
    cycles: Vec<Vec<Coords>>,
    #[serde(default)]
    polylines: Vec<Vec<Coords>>,
    #[serde(default)]
    segments: Vec<(Coords, Coords)>,
    #[serde(default)]
    eps: Option<f64>,
    assert: Option<Assertion>,
}

impl RegressionCaseDeclaration {
    fn segments(&self) -> Result<Segments, Failed> {
        let mut ret = Segments::default();
        if let Some(path) = &self.svg_path {
            let path = BezPath::from_svg(path).map_err(|e| format!("bad svg path: {e}"))?;
            ret.add_bez_path(&path, 1e-3);
        }
        ret.add_cycles(self.cycles.iter().cloned());
        for polyline in &self.polylines {
            ret.add_points(polyline.iter().copied());
        }
        for &(a, b) in &self.segments {
            ret.add_segment(a, b);
        }
        Ok(ret)
    }
}

fn main() {
    let args = Arguments::from_args();
    let tests = regression_tests();

    libtest_mimic::run(&args, tests).exit();
}

fn regression_tests() -> Vec<Trial> {
    let ws = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let file_paths = glob::glob(&format!("{ws}/tests/regression/**/*.yml")).unwrap();

    file_paths
        .into_iter()
        .map(|p| {
            let p = p.unwrap();
            let name = input_path_base(&p).display().to_string();
            Trial::test(name, || generate_regression_test(p))
        })
        .collect()
}

fn input_path_base(input_path: &Path) -> &Path {
    let ws = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let base = format!("{ws}/tests/regression");
    input_path.strip_prefix(base).unwrap()
}

fn generate_regression_test(path: PathBuf) -> Result<(), Failed> {
    let input = std::fs::read_to_string(&path)?;
    let case: RegressionCaseDeclaration = serde_yaml::from_str(&input)?;
    let segments = case.segments()?;

    let ints = match case.eps {
        Some(eps) => find_intersections_with_eps(&segments, eps)?,
        None => find_intersections(&segments)?,
    };

    match case.assert.unwrap_or(Assertion::NoPanic) {
        Assertion::NoPanic => {
            let reference = brute_force(&segments);
            if ints != reference {
                return Err(format!("sweep found {ints:?}, brute force found {reference:?}").into());
            }
        }
        Assertion::Pairs(expected) => {
            let actual: Vec<(usize, usize)> = ints
                .iter()
                .map(|pair| (pair.first().0, pair.second().0))
                .collect();
            if actual != expected {
                return Err(format!("expected {expected:?}, found {actual:?}").into());
            }
        }
    }

    Ok(())
}
