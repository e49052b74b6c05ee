//! Command stream and shader-global parameter state
//!
//! The pipeline's external boundary is shader-global state: named scalars,
//! vectors, fixed-size arrays and texture bindings that shader stages read.
//! `CommandStream` records both the per-frame command list (render-target
//! setup, clears, debug scopes) and the global parameter store. Globals
//! persist across `clear()` exactly like real GPU global state does, which
//! is why every publisher must fully overwrite its parameters each frame
//! rather than assume a clean slate.

use std::collections::{HashMap, HashSet};

use glam::{Mat4, Vec4};

use crate::gpu::resources::TextureHandle;

/// A value published as a named shader global
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalParam {
    Float(f32),
    Int(i32),
    Vec4(Vec4),
    Mat4(Mat4),
    Vec4Array(Vec<Vec4>),
    Mat4Array(Vec<Mat4>),
    Texture(TextureHandle),
}

/// A recorded command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BeginSample(String),
    EndSample,
    SetRenderTarget {
        color: TextureHandle,
        depth: Option<TextureHandle>,
    },
    ClearRenderTarget {
        clear_depth: bool,
        clear_color: bool,
        color: Vec4,
    },
    SetViewProjection {
        view: Mat4,
        projection: Mat4,
    },
}

/// Per-frame command recording plus persistent shader-global state
#[derive(Debug, Default)]
pub struct CommandStream {
    commands: Vec<Command>,
    globals: HashMap<String, GlobalParam>,
    keywords: HashSet<String>,
}

impl CommandStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard recorded commands. Globals and keywords survive, matching
    /// the lifetime of real shader-global state on the device.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn begin_sample(&mut self, name: &str) {
        self.commands.push(Command::BeginSample(name.to_string()));
    }

    pub fn end_sample(&mut self) {
        self.commands.push(Command::EndSample);
    }

    pub fn set_render_target(&mut self, color: TextureHandle, depth: Option<TextureHandle>) {
        self.commands.push(Command::SetRenderTarget { color, depth });
    }

    pub fn clear_render_target(&mut self, clear_depth: bool, clear_color: bool, color: Vec4) {
        self.commands.push(Command::ClearRenderTarget {
            clear_depth,
            clear_color,
            color,
        });
    }

    pub fn set_view_projection(&mut self, view: Mat4, projection: Mat4) {
        self.commands.push(Command::SetViewProjection { view, projection });
    }

    pub fn enable_keyword(&mut self, keyword: &str) {
        self.keywords.insert(keyword.to_string());
    }

    pub fn disable_keyword(&mut self, keyword: &str) {
        self.keywords.remove(keyword);
    }

    pub fn is_keyword_enabled(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword)
    }

    pub fn set_global_float(&mut self, name: &str, value: f32) {
        self.globals.insert(name.to_string(), GlobalParam::Float(value));
    }

    pub fn set_global_int(&mut self, name: &str, value: i32) {
        self.globals.insert(name.to_string(), GlobalParam::Int(value));
    }

    pub fn set_global_vec4(&mut self, name: &str, value: Vec4) {
        self.globals.insert(name.to_string(), GlobalParam::Vec4(value));
    }

    pub fn set_global_mat4(&mut self, name: &str, value: Mat4) {
        self.globals.insert(name.to_string(), GlobalParam::Mat4(value));
    }

    pub fn set_global_vec4_array(&mut self, name: &str, values: &[Vec4]) {
        self.globals
            .insert(name.to_string(), GlobalParam::Vec4Array(values.to_vec()));
    }

    pub fn set_global_mat4_array(&mut self, name: &str, values: &[Mat4]) {
        self.globals
            .insert(name.to_string(), GlobalParam::Mat4Array(values.to_vec()));
    }

    pub fn set_global_texture(&mut self, name: &str, texture: TextureHandle) {
        self.globals
            .insert(name.to_string(), GlobalParam::Texture(texture));
    }

    pub fn global(&self, name: &str) -> Option<&GlobalParam> {
        self.globals.get(name)
    }

    pub fn global_float(&self, name: &str) -> Option<f32> {
        match self.globals.get(name) {
            Some(GlobalParam::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn global_int(&self, name: &str) -> Option<i32> {
        match self.globals.get(name) {
            Some(GlobalParam::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn global_vec4(&self, name: &str) -> Option<Vec4> {
        match self.globals.get(name) {
            Some(GlobalParam::Vec4(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn global_vec4_array(&self, name: &str) -> Option<&[Vec4]> {
        match self.globals.get(name) {
            Some(GlobalParam::Vec4Array(v)) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn global_mat4_array(&self, name: &str) -> Option<&[Mat4]> {
        match self.globals.get(name) {
            Some(GlobalParam::Mat4Array(v)) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn global_texture(&self, name: &str) -> Option<TextureHandle> {
        match self.globals.get(name) {
            Some(GlobalParam::Texture(t)) => Some(*t),
            _ => None,
        }
    }
}
