//! Parser for pbrt-style scene files.
//!
//! # Supported Syntax
//!
//! - Transforms: `Identity`, `Translate`, `Scale`, `Rotate`, `LookAt`,
//!   `Transform`, `ConcatTransform`
//! - Options: `Camera "perspective"`, `Sampler`, `Integrator`, `Film`
//!   (`PixelFilter`, `ColorSpace`, `Accelerator` are read and ignored)
//! - World: `WorldBegin`, `AttributeBegin`/`AttributeEnd`,
//!   `MakeNamedMaterial`, `NamedMaterial`, `Material`, `AreaLightSource`,
//!   `Shape "trianglemesh"` and `Shape "bilinearmesh"`
//!
//! Named materials and the attribute stack live in a [`ParserContext`] that
//! is threaded through every directive.

use std::collections::HashMap;

use flow_math::{Mat4, Vec3};

use super::error::{ParseError, ParseResult};
use super::tokenizer::{Spanned, Token};
use crate::mesh::Mesh;
use crate::scene::{
    CameraDesc, Emission, FovAxis, IntegratorKind, MaterialDesc, SceneDescription, Shape,
};

/// Value list of a parameter.
#[derive(Debug, Clone, PartialEq)]
enum ParamValue {
    Numbers(Vec<f64>),
    Strings(Vec<String>),
}

/// A typed parameter such as `"rgb reflectance" [ 0.5 0.5 0.5 ]`.
#[derive(Debug, Clone)]
struct Param {
    ty: String,
    name: String,
    value: ParamValue,
    line: usize,
}

impl Param {
    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::Parse {
            line: self.line,
            message: format!("parameter '{} {}': {}", self.ty, self.name, message.into()),
        }
    }

    fn numbers(&self) -> ParseResult<&[f64]> {
        match &self.value {
            ParamValue::Numbers(values) => Ok(values),
            ParamValue::Strings(_) => Err(self.error("expected numbers")),
        }
    }
}

/// Parameters trailing a directive.
#[derive(Debug, Default)]
struct ParamSet {
    params: Vec<Param>,
}

impl ParamSet {
    fn find(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    fn float(&self, name: &str) -> ParseResult<Option<f32>> {
        let Some(param) = self.find(name) else {
            return Ok(None);
        };
        match param.numbers()? {
            [value] => Ok(Some(*value as f32)),
            _ => Err(param.error("expected a single value")),
        }
    }

    fn integer(&self, name: &str) -> ParseResult<Option<u32>> {
        let Some(param) = self.find(name) else {
            return Ok(None);
        };
        match param.numbers()? {
            [value] => to_u32(*value)
                .map(Some)
                .ok_or_else(|| param.error("expected a non-negative integer")),
            _ => Err(param.error("expected a single value")),
        }
    }

    fn string(&self, name: &str) -> ParseResult<Option<&str>> {
        let Some(param) = self.find(name) else {
            return Ok(None);
        };
        match &param.value {
            ParamValue::Strings(values) if values.len() == 1 => Ok(Some(values[0].as_str())),
            _ => Err(param.error("expected a single string")),
        }
    }

    fn rgb(&self, name: &str) -> ParseResult<Option<Vec3>> {
        let Some(param) = self.find(name) else {
            return Ok(None);
        };
        if param.ty != "rgb" {
            log::warn!(
                "Line {}: '{} {}' is not supported, only rgb values are",
                param.line,
                param.ty,
                param.name
            );
            return Ok(None);
        }
        match param.numbers()? {
            [r, g, b] => Ok(Some(Vec3::new(*r as f32, *g as f32, *b as f32))),
            _ => Err(param.error("expected 3 values")),
        }
    }

    fn points(&self, name: &str) -> ParseResult<Option<Vec<Vec3>>> {
        let Some(param) = self.find(name) else {
            return Ok(None);
        };
        let values = param.numbers()?;
        if values.len() % 3 != 0 {
            return Err(param.error("value count is not a multiple of 3"));
        }
        Ok(Some(
            values
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32))
                .collect(),
        ))
    }

    fn indices(&self, name: &str) -> ParseResult<Option<Vec<u32>>> {
        let Some(param) = self.find(name) else {
            return Ok(None);
        };
        param
            .numbers()?
            .iter()
            .map(|&v| to_u32(v).ok_or_else(|| param.error(format!("invalid index {v}"))))
            .collect::<ParseResult<Vec<_>>>()
            .map(Some)
    }
}

fn to_u32(value: f64) -> Option<u32> {
    (value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64).then_some(value as u32)
}

/// Attribute state saved by `AttributeBegin`.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Mat4,
    material: MaterialDesc,
    area_light: Option<Emission>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Mat4::IDENTITY,
            material: MaterialDesc::default(),
            area_light: None,
        }
    }
}

/// Mutable state of one parse: the scene under construction, the named
/// material table and the attribute stack.
#[derive(Debug)]
pub struct ParserContext {
    scene: SceneDescription,
    named_materials: HashMap<String, MaterialDesc>,
    state: GraphicsState,
    /// Saved states and the line of their `AttributeBegin`
    stack: Vec<(GraphicsState, usize)>,
    camera_from_world: Option<Mat4>,
    /// pbrt field of view, along the shorter image axis
    fov: f32,
}

impl ParserContext {
    /// Start a new parse for a scene called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            scene: SceneDescription::new(name),
            named_materials: HashMap::new(),
            state: GraphicsState::default(),
            stack: Vec::new(),
            camera_from_world: None,
            fov: 90.0,
        }
    }

    /// Look up a material declared with `MakeNamedMaterial`.
    pub fn named_material(&self, name: &str) -> Option<&MaterialDesc> {
        self.named_materials.get(name)
    }

    /// Number of open `AttributeBegin` blocks.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The scene as parsed so far.
    pub fn scene(&self) -> &SceneDescription {
        &self.scene
    }

    fn push(&mut self, line: usize) {
        self.stack.push((self.state.clone(), line));
    }

    fn pop(&mut self, line: usize) -> ParseResult<()> {
        let (state, _) = self.stack.pop().ok_or_else(|| ParseError::Parse {
            line,
            message: "AttributeEnd without matching AttributeBegin".to_string(),
        })?;
        self.state = state;
        Ok(())
    }

    fn add_shape(&mut self, kind: &str, mesh: Mesh, line: usize) -> ParseResult<()> {
        mesh.validate().map_err(|e| ParseError::Parse {
            line,
            message: e.to_string(),
        })?;
        let name = format!("{}_{}", kind, self.scene.shapes.len());
        self.scene.add_shape(Shape {
            name,
            mesh: mesh.transformed(&self.state.ctm),
            material: self.state.material,
            emission: self.state.area_light,
        });
        Ok(())
    }

    /// Close the parse and produce the description.
    pub fn finish(mut self) -> ParseResult<SceneDescription> {
        if let Some((_, line)) = self.stack.last() {
            return Err(ParseError::UnclosedBlock(*line));
        }

        if let Some(camera_from_world) = self.camera_from_world {
            // pbrt cameras look down +Z; ours look down -Z.
            let flip = Mat4::from_scale(Vec3::new(1.0, 1.0, -1.0));
            self.scene.camera = CameraDesc {
                model: camera_from_world.inverse() * flip,
                fov: self.fov,
                fov_axis: FovAxis::Shorter,
            };
        }

        log::debug!(
            "Parsed scene '{}': {} shapes, {} named materials",
            self.scene.name,
            self.scene.shapes.len(),
            self.named_materials.len()
        );
        Ok(self.scene)
    }
}

/// Cursor over a token stream.
pub struct Parser<'a> {
    tokens: &'a [Spanned],
    position: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Spanned]) -> Self {
        Self { tokens, position: 0 }
    }

    /// Apply every directive in the stream to `ctx`.
    pub fn parse(&mut self, ctx: &mut ParserContext) -> ParseResult<()> {
        while let Some(spanned) = self.next() {
            match &spanned.token {
                Token::Identifier(name) => self.directive(name, spanned.line, ctx)?,
                other => {
                    return Err(ParseError::Parse {
                        line: spanned.line,
                        message: format!("expected a directive, found {other:?}"),
                    })
                }
            }
        }
        Ok(())
    }

    fn peek(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<&'a Spanned> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    fn string(&mut self, directive: &str) -> ParseResult<&'a str> {
        let spanned = self.next().ok_or(ParseError::UnexpectedEof)?;
        match &spanned.token {
            Token::Str(s) => Ok(s),
            other => Err(ParseError::Parse {
                line: spanned.line,
                message: format!("{directive} expects a quoted name, found {other:?}"),
            }),
        }
    }

    /// Read `count` numbers, optionally wrapped in brackets.
    fn numbers(&mut self, count: usize, directive: &str) -> ParseResult<Vec<f32>> {
        let bracketed = matches!(self.peek().map(|s| &s.token), Some(Token::ListStart));
        if bracketed {
            self.position += 1;
        }

        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            let spanned = self.next().ok_or(ParseError::UnexpectedEof)?;
            match spanned.token {
                Token::Number(v) => values.push(v as f32),
                ref other => {
                    return Err(ParseError::Parse {
                        line: spanned.line,
                        message: format!("{directive} expects {count} numbers, found {other:?}"),
                    })
                }
            }
        }

        if bracketed {
            let spanned = self.next().ok_or(ParseError::UnexpectedEof)?;
            if spanned.token != Token::ListEnd {
                return Err(ParseError::Parse {
                    line: spanned.line,
                    message: format!("{directive} expects exactly {count} numbers"),
                });
            }
        }
        Ok(values)
    }

    /// Read the `"type name" value` pairs that follow a directive.
    fn params(&mut self) -> ParseResult<ParamSet> {
        let mut set = ParamSet::default();

        while let Some(Spanned {
            token: Token::Str(decl),
            line,
        }) = self.peek()
        {
            let mut parts = decl.split_whitespace();
            let (Some(ty), Some(name), None) = (parts.next(), parts.next(), parts.next()) else {
                break;
            };
            self.position += 1;
            let value = self.param_value(*line)?;
            set.params.push(Param {
                ty: ty.to_string(),
                name: name.to_string(),
                value,
                line: *line,
            });
        }

        Ok(set)
    }

    fn param_value(&mut self, line: usize) -> ParseResult<ParamValue> {
        let spanned = self.next().ok_or(ParseError::UnexpectedEof)?;
        let items: Vec<&Token> = match &spanned.token {
            Token::ListStart => {
                let mut items = Vec::new();
                loop {
                    let item = self.next().ok_or(ParseError::UnexpectedEof)?;
                    if item.token == Token::ListEnd {
                        break;
                    }
                    items.push(&item.token);
                }
                items
            }
            single => vec![single],
        };

        if items.iter().all(|t| matches!(t, Token::Number(_))) {
            Ok(ParamValue::Numbers(
                items
                    .iter()
                    .filter_map(|t| match t {
                        Token::Number(v) => Some(*v),
                        _ => None,
                    })
                    .collect(),
            ))
        } else {
            items
                .iter()
                .map(|t| match t {
                    Token::Str(s) | Token::Identifier(s) => Ok(s.clone()),
                    other => Err(ParseError::Parse {
                        line,
                        message: format!("unexpected {other:?} in parameter value"),
                    }),
                })
                .collect::<ParseResult<Vec<_>>>()
                .map(ParamValue::Strings)
        }
    }

    fn skip_to_next_directive(&mut self) {
        while let Some(spanned) = self.peek() {
            if matches!(spanned.token, Token::Identifier(ref s) if s != "true" && s != "false") {
                break;
            }
            self.position += 1;
        }
    }

    fn directive(&mut self, name: &str, line: usize, ctx: &mut ParserContext) -> ParseResult<()> {
        match name {
            "Identity" => ctx.state.ctm = Mat4::IDENTITY,
            "Translate" => {
                let v = self.numbers(3, name)?;
                ctx.state.ctm *= Mat4::from_translation(Vec3::new(v[0], v[1], v[2]));
            }
            "Scale" => {
                let v = self.numbers(3, name)?;
                ctx.state.ctm *= Mat4::from_scale(Vec3::new(v[0], v[1], v[2]));
            }
            "Rotate" => {
                let v = self.numbers(4, name)?;
                let axis = Vec3::new(v[1], v[2], v[3])
                    .try_normalize()
                    .ok_or_else(|| ParseError::Parse {
                        line,
                        message: "Rotate axis has zero length".to_string(),
                    })?;
                ctx.state.ctm *= Mat4::from_axis_angle(axis, v[0].to_radians());
            }
            "LookAt" => {
                let v = self.numbers(9, name)?;
                let eye = Vec3::new(v[0], v[1], v[2]);
                let look = Vec3::new(v[3], v[4], v[5]);
                let up = Vec3::new(v[6], v[7], v[8]);
                let camera_from_world =
                    pbrt_look_at(eye, look, up).ok_or_else(|| ParseError::Parse {
                        line,
                        message: "LookAt is degenerate".to_string(),
                    })?;
                ctx.state.ctm *= camera_from_world;
            }
            "Transform" | "ConcatTransform" => {
                let v = self.numbers(16, name)?;
                let mut cols = [0.0; 16];
                cols.copy_from_slice(&v);
                let matrix = Mat4::from_cols_array(&cols);
                if name == "Transform" {
                    ctx.state.ctm = matrix;
                } else {
                    ctx.state.ctm *= matrix;
                }
            }
            "Camera" => {
                let kind = self.string(name)?;
                let params = self.params()?;
                if kind != "perspective" {
                    log::warn!("Line {}: camera '{}' treated as perspective", line, kind);
                }
                if ctx.state.ctm.determinant().abs() < f32::EPSILON {
                    return Err(ParseError::Parse {
                        line,
                        message: "camera transform is singular".to_string(),
                    });
                }
                ctx.camera_from_world = Some(ctx.state.ctm);
                if let Some(fov) = params.float("fov")? {
                    ctx.fov = fov;
                }
            }
            "Sampler" => {
                self.string(name)?;
                let params = self.params()?;
                if let Some(samples) = params.integer("pixelsamples")? {
                    ctx.scene.samples = samples;
                }
            }
            "Integrator" => {
                let kind = self.string(name)?;
                let params = self.params()?;
                ctx.scene.integrator = IntegratorKind::from_name(kind).unwrap_or_else(|| {
                    log::warn!(
                        "Line {}: integrator '{}' is not supported, using path",
                        line,
                        kind
                    );
                    IntegratorKind::Path
                });
                // maxdepth counts scattering events; a path has one more segment
                if let Some(depth) = params.integer("maxdepth")? {
                    ctx.scene.max_depth = depth.saturating_add(1);
                }
            }
            "Film" => {
                self.string(name)?;
                let params = self.params()?;
                if let Some(width) = params.integer("xresolution")? {
                    ctx.scene.width = width;
                }
                if let Some(height) = params.integer("yresolution")? {
                    ctx.scene.height = height;
                }
            }
            "PixelFilter" | "ColorSpace" | "Accelerator" => {
                let kind = self.string(name)?;
                self.params()?;
                log::debug!("Line {}: ignoring {} '{}'", line, name, kind);
            }
            "WorldBegin" => {
                ctx.state.ctm = Mat4::IDENTITY;
            }
            "WorldEnd" => {}
            "AttributeBegin" | "TransformBegin" => ctx.push(line),
            "AttributeEnd" | "TransformEnd" => ctx.pop(line)?,
            "MakeNamedMaterial" => {
                let material_name = self.string(name)?;
                let params = self.params()?;
                let kind = params.string("type")?.unwrap_or("diffuse");
                let material = material_from_params(kind, &params, line)?;
                ctx.named_materials.insert(material_name.to_string(), material);
            }
            "NamedMaterial" => {
                let material_name = self.string(name)?;
                ctx.state.material = *ctx.named_material(material_name).ok_or_else(|| {
                    ParseError::UnknownMaterial {
                        name: material_name.to_string(),
                        line,
                    }
                })?;
            }
            "Material" => {
                let kind = self.string(name)?;
                let params = self.params()?;
                ctx.state.material = material_from_params(kind, &params, line)?;
            }
            "AreaLightSource" => {
                let kind = self.string(name)?;
                let params = self.params()?;
                if kind != "diffuse" {
                    log::warn!("Line {}: area light '{}' treated as diffuse", line, kind);
                }
                let radiance = params.rgb("L")?.unwrap_or(Vec3::ONE);
                let scale = params.float("scale")?.unwrap_or(1.0);
                ctx.state.area_light = Some(Emission::new(radiance, scale));
            }
            "LightSource" => {
                let kind = self.string(name)?;
                self.params()?;
                log::warn!(
                    "Line {}: skipping '{}' light, only area lights are supported",
                    line,
                    kind
                );
            }
            "Shape" => {
                let kind = self.string(name)?;
                let params = self.params()?;
                if let Some(mesh) = mesh_from_params(kind, &params, line)? {
                    ctx.add_shape(kind, mesh, line)?;
                }
            }
            other => {
                log::warn!("Line {}: skipping unsupported directive '{}'", line, other);
                self.skip_to_next_directive();
            }
        }
        Ok(())
    }
}

/// pbrt's LookAt: camera-from-world with the camera looking down +Z and
/// +X = up x dir.
fn pbrt_look_at(eye: Vec3, look: Vec3, up: Vec3) -> Option<Mat4> {
    let dir = (look - eye).try_normalize()?;
    let right = up.try_normalize()?.cross(dir).try_normalize()?;
    let new_up = dir.cross(right);
    let world_from_camera = Mat4::from_cols(
        right.extend(0.0),
        new_up.extend(0.0),
        dir.extend(0.0),
        eye.extend(1.0),
    );
    Some(world_from_camera.inverse())
}

fn material_from_params(kind: &str, params: &ParamSet, line: usize) -> ParseResult<MaterialDesc> {
    if kind != "diffuse" {
        log::warn!("Line {}: material '{}' rendered as diffuse", line, kind);
    }
    Ok(match params.rgb("reflectance")? {
        Some(reflectance) => MaterialDesc::Diffuse { reflectance },
        None => MaterialDesc::default(),
    })
}

fn mesh_from_params(kind: &str, params: &ParamSet, line: usize) -> ParseResult<Option<Mesh>> {
    let missing = |what: &str| ParseError::Parse {
        line,
        message: format!("{kind} requires {what}"),
    };

    match kind {
        "trianglemesh" => {
            let positions = params.points("P")?.ok_or_else(|| missing("\"point3 P\""))?;
            let indices = match params.indices("indices")? {
                Some(indices) => indices,
                None if positions.len() == 3 => vec![0, 1, 2],
                None => return Err(missing("\"integer indices\"")),
            };
            Ok(Some(Mesh::new(positions, indices)))
        }
        "bilinearmesh" => {
            let positions = params.points("P")?.ok_or_else(|| missing("\"point3 P\""))?;
            let patches = match params.indices("indices")? {
                Some(indices) => indices,
                None if positions.len() == 4 => vec![0, 1, 2, 3],
                None => return Err(missing("\"integer indices\"")),
            };
            if patches.len() % 4 != 0 {
                return Err(ParseError::Parse {
                    line,
                    message: "bilinearmesh index count is not a multiple of 4".to_string(),
                });
            }
            // Patch corners are p00 p10 p01 p11.
            let indices = patches
                .chunks_exact(4)
                .flat_map(|p| [p[0], p[1], p[3], p[0], p[3], p[2]])
                .collect();
            Ok(Some(Mesh::new(positions, indices)))
        }
        other => {
            log::warn!("Line {}: skipping unsupported shape '{}'", line, other);
            Ok(None)
        }
    }
}
