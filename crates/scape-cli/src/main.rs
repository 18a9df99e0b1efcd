//! `scape`: inspect, edit and query collision region files.

mod config;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use scape_collision::{Flag, GlobalCollisionMap, RECORD_SIZE};
use scape_core::WorldPoint;
use scape_paths::{Pathfinder, SearchState, chebyshev};

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "scape", about = "Collision region files and BFS path queries")]
struct Args {
    /// TOML config file with [search] and [log] sections
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Summarise the regions stored in a file
    Info { map: PathBuf },
    /// Find a shortest path between two tiles
    Path {
        map: PathBuf,
        /// Start tile as x,y,plane
        #[arg(long, value_parser = parse_point)]
        from: WorldPoint,
        /// Target tile as x,y,plane
        #[arg(long, value_parser = parse_point)]
        to: WorldPoint,
        /// Give up after visiting this many tiles (overrides the config file)
        #[arg(long)]
        max_visited: Option<usize>,
    },
    /// Add fully open regions to a file, creating it if needed
    Open {
        out: PathBuf,
        /// Region ids to create
        #[arg(short, long = "region", required = true)]
        regions: Vec<u16>,
        /// Keep the regions already in `out`
        #[arg(long)]
        append: bool,
    },
    /// Change the stored flags of one tile
    Set {
        map: PathBuf,
        /// Tile as x,y,plane
        #[arg(long, value_parser = parse_point)]
        at: WorldPoint,
        #[arg(long)]
        north: Option<bool>,
        #[arg(long)]
        east: Option<bool>,
        /// Write here instead of overwriting `map`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_point(s: &str) -> Result<WorldPoint, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, plane] = parts.as_slice() else {
        return Err(format!("expected x,y,plane, got {s:?}"));
    };
    let num = |v: &str| v.parse::<i32>().map_err(|e| format!("{v:?}: {e}"));
    Ok(WorldPoint::new(num(x)?, num(y)?, num(plane)?))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let env = env_logger::Env::default().default_filter_or(cfg.log.level.as_str());
    env_logger::Builder::from_env(env).init();

    match args.command {
        Command::Info { map } => info(&map),
        Command::Path {
            map,
            from,
            to,
            max_visited,
        } => path(&map, from, to, max_visited.or(cfg.search.max_visited)),
        Command::Open {
            out,
            regions,
            append,
        } => open(&out, &regions, append),
        Command::Set {
            map,
            at,
            north,
            east,
            output,
        } => set(&map, at, north, east, output.as_deref()),
    }
}

fn load(path: &Path) -> anyhow::Result<GlobalCollisionMap> {
    GlobalCollisionMap::open(path)
        .with_context(|| format!("loading {}", path.display()))
}

fn info(path: &Path) -> anyhow::Result<()> {
    let map = load(path)?;
    let mut out = std::io::stdout().lock();
    writeln!(
        out,
        "{}: {} regions, {} bytes",
        path.display(),
        map.region_count(),
        map.region_count() * RECORD_SIZE
    )?;
    for (id, grid) in map.iter() {
        let base = WorldPoint::from_region(id, 0, 0, 0);
        let open = grid.count_ones() as f64 / grid.len() as f64;
        writeln!(
            out,
            "  region {id:5} at ({:5}, {:5})  {:6.2}% open",
            base.x,
            base.y,
            open * 100.0
        )?;
    }
    Ok(())
}

fn path(
    path: &Path,
    from: WorldPoint,
    to: WorldPoint,
    max_visited: Option<usize>,
) -> anyhow::Result<()> {
    let map = load(path)?;
    let mut pf = Pathfinder::new(&map, from, to);
    if let Some(limit) = max_visited {
        pf = pf.with_max_visited(limit);
    }
    let route = pf.find();

    if pf.state() != SearchState::Found {
        log::info!("visited {} tiles", pf.visited());
        bail!("no path from {from} to {to}");
    }

    let mut out = std::io::stdout().lock();
    for p in &route {
        writeln!(out, "{} {} {}", p.x, p.y, p.plane)?;
    }
    log::info!(
        "{} moves (lower bound {}), visited {} tiles",
        route.len() - 1,
        chebyshev(from, to).unwrap_or_default(),
        pf.visited()
    );
    Ok(())
}

fn open(out: &Path, regions: &[u16], append: bool) -> anyhow::Result<()> {
    let mut map = if append && out.exists() {
        load(out)?
    } else {
        GlobalCollisionMap::new()
    };
    for &id in regions {
        if map.has_region(id) {
            log::warn!("replacing region {id}");
        }
        map.create_region(id);
    }
    map.save(out)
        .with_context(|| format!("writing {}", out.display()))?;
    log::info!("{} now holds {} regions", out.display(), map.region_count());
    Ok(())
}

fn set(
    path: &Path,
    at: WorldPoint,
    north: Option<bool>,
    east: Option<bool>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    if north.is_none() && east.is_none() {
        bail!("nothing to change: pass --north and/or --east");
    }
    let mut map = load(path)?;
    for (flag, value) in [(Flag::North, north), (Flag::East, east)] {
        let Some(value) = value else { continue };
        if !map.set(at.x, at.y, at.plane, flag, value)? {
            bail!("{at} lies in a region that is not in {}", path.display());
        }
    }
    let dest = output.unwrap_or(path);
    map.save(dest)
        .with_context(|| format!("writing {}", dest.display()))?;
    log::info!("updated {at} in {}", dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scape_collision::CollisionMap;

    #[test]
    fn parses_points() {
        assert_eq!(parse_point("3200,3201,1"), Ok(WorldPoint::new(3200, 3201, 1)));
        assert_eq!(parse_point(" 1, -2 ,0"), Ok(WorldPoint::new(1, -2, 0)));
        assert!(parse_point("1,2").is_err());
        assert!(parse_point("1,2,x").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn parses_path_command() {
        let args = Args::try_parse_from([
            "scape", "path", "map.bin", "--from", "1,2,0", "--to", "3,4,0",
        ])
        .unwrap();
        match args.command {
            Command::Path {
                from,
                to,
                max_visited,
                ..
            } => {
                assert_eq!(from, WorldPoint::new(1, 2, 0));
                assert_eq!(to, WorldPoint::new(3, 4, 0));
                assert_eq!(max_visited, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn temp_file(name: &str) -> PathBuf {
        let file = format!("scape-cli-{}-{name}.bin", std::process::id());
        std::env::temp_dir().join(file)
    }

    #[test]
    fn open_then_set_edits_the_file() {
        let path = temp_file("edit");
        open(&path, &[0, 0x3232], false).unwrap();
        open(&path, &[7], true).unwrap();
        let map = load(&path).unwrap();
        assert_eq!(map.region_ids().collect::<Vec<_>>(), vec![0, 7, 0x3232]);

        let at = WorldPoint::new(10, 12, 1);
        set(&path, at, Some(false), None, None).unwrap();
        let map = load(&path).unwrap();
        assert!(!map.n(10, 12, 1));
        assert!(map.e(10, 12, 1));

        // Without --append the file starts over.
        open(&path, &[5], false).unwrap();
        let map = load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(map.region_ids().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn set_writes_to_a_separate_output() {
        let path = temp_file("src");
        let out = temp_file("dst");
        open(&path, &[0], false).unwrap();
        let at = WorldPoint::new(1, 1, 0);
        set(&path, at, None, Some(false), Some(out.as_path())).unwrap();
        let before = load(&path).unwrap();
        let after = load(&out).unwrap();
        std::fs::remove_file(&path).unwrap();
        std::fs::remove_file(&out).unwrap();
        assert!(before.e(1, 1, 0));
        assert!(!after.e(1, 1, 0));
    }

    #[test]
    fn set_fails_outside_allocated_regions() {
        let path = temp_file("unallocated");
        open(&path, &[0], false).unwrap();
        let err = set(&path, WorldPoint::new(100, 100, 0), Some(false), None, None);
        let nothing = set(&path, WorldPoint::new(1, 1, 0), None, None, None);
        std::fs::remove_file(&path).unwrap();
        assert!(err.unwrap_err().to_string().contains("not in"));
        assert!(nothing.is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let path = temp_file("missing");
        let err = load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("loading"));
    }
}
