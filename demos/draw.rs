use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use polycross::{find_intersections, DraftEvent, PolygonDraft, Segments};

#[derive(Copy, Clone, Debug)]
struct Coords(f64, f64);

impl FromStr for Coords {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected `x,y`, got {s}"))?;
        let parse = |c: &str| {
            c.trim()
                .parse::<f64>()
                .map_err(|e| format!("bad coordinate {c}: {e}"))
        };
        Ok(Coords(parse(x)?, parse(y)?))
    }
}

/// Replays a polygon drawing session, reporting conflicting edges after every step.
#[derive(Parser)]
struct Cli {
    /// Vertices to place, as `x,y`. Placing the first vertex again closes the polygon.
    #[arg(required = true, allow_hyphen_values = true)]
    vertices: Vec<Coords>,

    /// Where the pointer is dragged to after the last vertex.
    #[arg(long, allow_hyphen_values = true)]
    drag: Option<Coords>,

    /// Write an SVG of the final state, with conflicting edges in red.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn report(segs: &Segments) -> anyhow::Result<()> {
    let ints = find_intersections(segs)?;
    if ints.is_empty() {
        println!("  no conflicts");
    }
    for pair in &ints {
        println!("  edges {} and {} conflict", pair.first().0, pair.second().0);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut draft = PolygonDraft::new();
    let mut closed = None;
    for &Coords(x, y) in &cli.vertices {
        match draft.add_vertex((x, y)) {
            DraftEvent::Added(i) => println!("vertex {i} at ({x}, {y})"),
            DraftEvent::Closed(vertices) => {
                println!("closed a polygon with {} vertices", vertices.len());
                closed = Some(vertices);
                break;
            }
            DraftEvent::Ignored => println!("({x}, {y}) is already a vertex"),
        }
        report(&draft.segments())?;
    }

    let segs = match closed {
        Some(vertices) => Segments::from_closed_cycle(vertices),
        None => {
            if let Some(Coords(x, y)) = cli.drag {
                draft.drag_to((x, y));
                println!("dragged to ({x}, {y})");
            }
            draft.segments()
        }
    };
    report(&segs)?;

    if let Some(path) = cli.output {
        let ints = find_intersections(&segs)?;
        svg::save(path, &segs.dump_svg(&ints))?;
    }

    Ok(())
}
