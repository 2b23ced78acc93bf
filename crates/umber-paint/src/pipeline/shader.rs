//! Per-descriptor specialization of the paint shader.
//!
//! `paint.wgsl` is a single source with `#ifdef NAME`, `#ifndef NAME`, `#else`
//! and `#endif` lines. Each descriptor maps to a set of defines; inactive blocks
//! are dropped before the source reaches wgpu, so unused bindings never appear
//! in the module.

use std::collections::HashSet;

use anyhow::{bail, Result};

use crate::paint::{CycleMethod, PaintKind};

use super::PipelineDescriptor;

const PAINT_WGSL: &str = include_str!("shaders/paint.wgsl");

/// Returns the defines describing `d`.
pub(super) fn defines(d: &PipelineDescriptor) -> HashSet<&'static str> {
    let mut set = HashSet::new();
    set.insert(match d.kind {
        PaintKind::Color => "PAINT_COLOR",
        PaintKind::LinearGradient => "PAINT_LINEAR",
        PaintKind::RadialGradient => "PAINT_RADIAL",
        PaintKind::Texture => "PAINT_TEXTURE",
    });
    match d.cycle {
        Some(CycleMethod::Reflect) => {
            set.insert("CYCLE_REFLECT");
        }
        Some(CycleMethod::Repeat) => {
            set.insert("CYCLE_REPEAT");
        }
        Some(CycleMethod::NoCycle) | None => {}
    }
    if d.use_mask {
        set.insert("USE_MASK");
    }
    if d.is_texture {
        set.insert("IS_TEXTURE");
    }
    if d.needs_sampler() {
        set.insert("NEEDS_SAMPLER");
    }
    if d.src_flags.is_opaque {
        set.insert("SRC_OPAQUE");
    }
    if !d.src_flags.is_premultiplied {
        set.insert("SRC_UNPREMULTIPLIED");
    }
    set
}

/// Paint shader source specialized for `d`.
pub(super) fn specialize(d: &PipelineDescriptor) -> Result<String> {
    preprocess(PAINT_WGSL, &defines(d))
}

struct Block {
    active: bool,
    parent_active: bool,
    else_seen: bool,
}

pub(super) fn preprocess(input: &str, defines: &HashSet<&str>) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut stack: Vec<Block> = Vec::new();

    for (line_number, line) in input.lines().enumerate() {
        let trimmed = line.trim_start();
        let active = stack.last().is_none_or(|b| b.active);

        if let Some(rest) = trimmed.strip_prefix('#') {
            let mut parts = rest.split_whitespace();
            let directive = parts.next().unwrap_or_default();
            let arg = parts.next();
            match (directive, arg) {
                ("ifdef", Some(name)) | ("ifndef", Some(name)) => {
                    let defined = defines.contains(name);
                    let taken = if directive == "ifdef" { defined } else { !defined };
                    stack.push(Block { active: active && taken, parent_active: active, else_seen: false });
                }
                ("else", None) => {
                    let Some(block) = stack.last_mut() else {
                        bail!("line {}: #else without #ifdef", line_number + 1);
                    };
                    if block.else_seen {
                        bail!("line {}: duplicate #else", line_number + 1);
                    }
                    block.else_seen = true;
                    block.active = block.parent_active && !block.active;
                }
                ("endif", None) => {
                    if stack.pop().is_none() {
                        bail!("line {}: #endif without #ifdef", line_number + 1);
                    }
                }
                _ => bail!("line {}: unknown directive `#{}`", line_number + 1, rest.trim()),
            }
            continue;
        }

        if active {
            out.push_str(line);
            out.push('\n');
        }
    }

    if !stack.is_empty() {
        bail!("{} unterminated #ifdef block(s)", stack.len());
    }
    Ok(out)
}
