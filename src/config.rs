use std::path::PathBuf;

use bitflags::bitflags;
use clap::Parser;

use crate::types::CoordSys;

bitflags! {
    /// Load/save options. Flags compose with `|`.
    ///
    /// ```
    /// use nanomesh::Options;
    ///
    /// let opts = Options::SINGLE_GROUP | Options::LOG;
    /// assert_eq!(opts.to_string(), "SingleGroup|Log");
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Options: u32 {
        /// LOAD: ignore named groups and put every face into the first group.
        /// Breaks multi-material meshes.
        const SINGLE_GROUP = 1 << 0;
        /// LOAD: keep groups without faces as metadata placeholders.
        const EMPTY_GROUPS = 1 << 1;
        /// LOAD+SAVE: log failures and return `Ok(false)` instead of `Err`.
        const NO_THROW = 1 << 2;
        /// LOAD+SAVE: log per-group statistics.
        const LOG = 1 << 3;
        /// LOAD: split vertices on non-contiguous UV shells. Vertex count and
        /// order are unchanged when the UVs are already contiguous.
        const SPLIT_SEAMS = 1 << 4;
        /// LOAD: flatten normals, UVs and colors to one slot per position.
        const FLATTEN = 1 << 5;
        /// LOAD: force clockwise face winding (counter-clockwise otherwise).
        const CLOCKWISE = 1 << 6;
        /// LOAD: game-engine preset, implies `SINGLE_GROUP | SPLIT_SEAMS |
        /// FLATTEN | CLOCKWISE` and a left-handed coordinate system.
        const ENGINE = 1 << 7;
    }
}

impl Options {
    /// Expands composite presets into the flags they stand for.
    pub fn expanded(self) -> Self {
        if self.contains(Options::ENGINE) {
            self | Options::SINGLE_GROUP
                | Options::SPLIT_SEAMS
                | Options::FLATTEN
                | Options::CLOCKWISE
        } else {
            self
        }
    }

    /// Coordinate system that loading must convert into, if any.
    pub fn target_coord_sys(self) -> Option<CoordSys> {
        self.contains(Options::ENGINE).then_some(CoordSys::LeftHanded)
    }
}

impl std::fmt::Display for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const NAMES: [(Options, &str); 8] = [
            (Options::SINGLE_GROUP, "SingleGroup"),
            (Options::EMPTY_GROUPS, "EmptyGroups"),
            (Options::NO_THROW, "NoThrow"),
            (Options::LOG, "Log"),
            (Options::SPLIT_SEAMS, "SplitSeams"),
            (Options::FLATTEN, "Flatten"),
            (Options::CLOCKWISE, "ClockWise"),
            (Options::ENGINE, "Engine"),
        ];
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Fully resolved configuration of a `nanomesh` run (constructed from CLI args).
#[derive(Debug, Clone, Default)]
pub struct ConvertConfig {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub options: Options,
    pub recalculate_normals: bool,
    pub weld_normals: bool,
    pub merge_groups: bool,
    pub json: bool,
    pub verbose: bool,
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "nanomesh",
    about = "Inspect and convert triangle meshes (OBJ, TXT)",
    version
)]
pub struct CliArgs {
    /// Input mesh (OBJ or TXT)
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Write the processed mesh to this file (OBJ)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Put every face into a single group
    #[arg(long)]
    pub single_group: bool,

    /// Keep groups without faces
    #[arg(long)]
    pub empty_groups: bool,

    /// Split vertices on UV seams
    #[arg(long)]
    pub split_seams: bool,

    /// Flatten attributes to one slot per vertex
    #[arg(long)]
    pub flatten: bool,

    /// Force clockwise face winding
    #[arg(long)]
    pub clockwise: bool,

    /// Game-engine preset (single group, split, flatten, clockwise, left-handed)
    #[arg(long)]
    pub engine: bool,

    /// Recompute normals after loading
    #[arg(long)]
    pub recalc_normals: bool,

    /// Weld normals across coincident unshared vertices (with --recalc-normals)
    #[arg(long, requires = "recalc_normals")]
    pub weld: bool,

    /// Merge all groups into one before writing
    #[arg(long)]
    pub merge: bool,

    /// Print statistics as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl From<CliArgs> for ConvertConfig {
    fn from(args: CliArgs) -> Self {
        let mut options = Options::empty();
        options.set(Options::SINGLE_GROUP, args.single_group);
        options.set(Options::EMPTY_GROUPS, args.empty_groups);
        options.set(Options::SPLIT_SEAMS, args.split_seams);
        options.set(Options::FLATTEN, args.flatten);
        options.set(Options::CLOCKWISE, args.clockwise);
        options.set(Options::ENGINE, args.engine);
        options.set(Options::LOG, args.verbose);

        ConvertConfig {
            input: args.input,
            output: args.output,
            options,
            recalculate_normals: args.recalc_normals,
            weld_normals: args.weld,
            merge_groups: args.merge,
            json: args.json,
            verbose: args.verbose,
        }
    }
}
