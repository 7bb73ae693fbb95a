//! Element handlers for Mitsuba XML scenes.
//!
//! `$name` references in attribute values are resolved against the
//! `<default>` table and BSDF `<ref>`s against the BSDF table, both held by
//! a [`MitsubaContext`].

use std::collections::HashMap;

use flow_math::{Mat4, Vec3};
use roxmltree::{Document, Node};

use super::error::{MitsubaError, MitsubaResult};
use super::values::{parse_array, parse_floats};
use crate::mesh::Mesh;
use crate::scene::{
    CameraDesc, Emission, FovAxis, IntegratorKind, MaterialDesc, SceneDescription, Shape,
};

/// Path length used for `max_depth = -1`.
pub const UNBOUNDED_DEPTH: u32 = 64;

/// Mutable state of one parse.
#[derive(Debug)]
pub struct MitsubaContext {
    scene: SceneDescription,
    defaults: HashMap<String, String>,
    bsdfs: HashMap<String, MaterialDesc>,
}

impl MitsubaContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            scene: SceneDescription::new(name),
            defaults: HashMap::new(),
            bsdfs: HashMap::new(),
        }
    }

    /// Value declared with `<default name=... value=...>`.
    pub fn default_value(&self, name: &str) -> Option<&str> {
        self.defaults.get(name).map(String::as_str)
    }

    /// BSDF declared at the top level with an `id`.
    pub fn bsdf(&self, id: &str) -> Option<&MaterialDesc> {
        self.bsdfs.get(id)
    }

    /// The scene as parsed so far.
    pub fn scene(&self) -> &SceneDescription {
        &self.scene
    }

    pub fn finish(self) -> SceneDescription {
        log::debug!(
            "Parsed scene '{}': {} shapes, {} BSDFs, {} defaults",
            self.scene.name,
            self.scene.shapes.len(),
            self.bsdfs.len(),
            self.defaults.len()
        );
        self.scene
    }

    /// Apply every element under `<scene>` in document order.
    pub fn parse_document(&mut self, doc: &Document) -> MitsubaResult<()> {
        let root = doc.root_element();
        if !root.has_tag_name("scene") {
            return Err(MitsubaError::NotAScene(root.tag_name().name().to_string()));
        }

        for node in elements(root) {
            match node.tag_name().name() {
                "default" => {
                    let name = attribute(node, "name")?;
                    let value = attribute(node, "value")?;
                    self.defaults.insert(name.to_string(), value.to_string());
                }
                "integrator" => self.integrator(node)?,
                "sensor" => self.sensor(node)?,
                "bsdf" => {
                    let material = self.material(node)?;
                    match node.attribute("id") {
                        Some(id) => {
                            self.bsdfs.insert(id.to_string(), material);
                        }
                        None => log::warn!(
                            "Line {}: top-level <bsdf> without an id cannot be referenced",
                            line(node)
                        ),
                    }
                }
                "shape" => self.shape(node)?,
                "emitter" => log::warn!(
                    "Line {}: skipping <emitter>, only area emitters on shapes are supported",
                    line(node)
                ),
                other => log::warn!("Line {}: skipping unsupported <{}>", line(node), other),
            }
        }
        Ok(())
    }

    /// An attribute with `$name` references resolved.
    fn resolve(&self, node: Node, name: &'static str) -> MitsubaResult<String> {
        let raw = attribute(node, name)?;
        match raw.strip_prefix('$') {
            Some(key) => self
                .defaults
                .get(key)
                .cloned()
                .ok_or_else(|| MitsubaError::UnknownReference {
                    name: key.to_string(),
                    line: line(node),
                }),
            None => Ok(raw.to_string()),
        }
    }

    fn integer(&self, node: Node) -> MitsubaResult<i64> {
        let text = self.resolve(node, "value")?;
        text.trim().parse().map_err(|_| invalid(node, text))
    }

    fn count(&self, node: Node) -> MitsubaResult<u32> {
        let value = self.integer(node)?;
        u32::try_from(value).map_err(|_| invalid(node, value.to_string()))
    }

    fn float(&self, node: Node) -> MitsubaResult<f32> {
        let text = self.resolve(node, "value")?;
        text.trim().parse().map_err(|_| invalid(node, text))
    }

    /// An `<rgb>` or `<float>` color; a single number is a gray.
    fn color(&self, node: Node) -> MitsubaResult<Vec3> {
        let text = self.resolve(node, "value")?;
        match parse_floats(&text).as_deref() {
            Some(&[v]) => Ok(Vec3::splat(v)),
            Some(&[r, g, b]) => Ok(Vec3::new(r, g, b)),
            _ => Err(invalid(node, text)),
        }
    }

    /// A 3-vector given as `value="x, y, z"`, `value="s"` or as separate
    /// `x`/`y`/`z` attributes (missing ones take `fill`).
    fn vector(&self, node: Node, fill: f32) -> MitsubaResult<Vec3> {
        if node.has_attribute("value") {
            return self.color(node);
        }
        let mut v = Vec3::splat(fill);
        for (i, axis) in ["x", "y", "z"].into_iter().enumerate() {
            if node.has_attribute(axis) {
                let text = self.resolve(node, axis)?;
                v[i] = text.trim().parse().map_err(|_| invalid(node, text))?;
            }
        }
        Ok(v)
    }

    /// A point attribute such as `origin="0, 0, 3"`.
    fn point(&self, node: Node, name: &'static str) -> MitsubaResult<Vec3> {
        let text = self.resolve(node, name)?;
        parse_array::<3>(&text)
            .map(Vec3::from_array)
            .ok_or_else(|| invalid(node, text))
    }

    /// Compose the steps of a `<transform>`. Each step applies after the
    /// ones before it.
    fn transform(&self, node: Node) -> MitsubaResult<Mat4> {
        let mut matrix = Mat4::IDENTITY;
        for step in elements(node) {
            let next = match step.tag_name().name() {
                "matrix" => {
                    let text = self.resolve(step, "value")?;
                    let values = parse_array::<16>(&text).ok_or_else(|| invalid(step, text))?;
                    // Row-major in the file
                    Mat4::from_cols_array(&values).transpose()
                }
                "translate" => Mat4::from_translation(self.vector(step, 0.0)?),
                "scale" => Mat4::from_scale(self.vector(step, 1.0)?),
                "rotate" => {
                    let axis = self.vector(step, 0.0)?;
                    let angle = match step.attribute("angle") {
                        Some(_) => {
                            let text = self.resolve(step, "angle")?;
                            text.trim().parse::<f32>().map_err(|_| invalid(step, text))?
                        }
                        None => 0.0,
                    };
                    let axis = axis.try_normalize().ok_or_else(|| MitsubaError::Invalid {
                        line: line(step),
                        message: "rotation axis has zero length".to_string(),
                    })?;
                    Mat4::from_axis_angle(axis, angle.to_radians())
                }
                "lookat" => {
                    let origin = self.point(step, "origin")?;
                    let target = self.point(step, "target")?;
                    let up = if step.has_attribute("up") {
                        self.point(step, "up")?
                    } else {
                        Vec3::Y
                    };
                    look_at(origin, target, up).ok_or_else(|| MitsubaError::Invalid {
                        line: line(step),
                        message: "lookat is degenerate".to_string(),
                    })?
                }
                other => {
                    return Err(MitsubaError::Invalid {
                        line: line(step),
                        message: format!("unsupported transform step <{other}>"),
                    })
                }
            };
            matrix = next * matrix;
        }
        Ok(matrix)
    }

    fn integrator(&mut self, node: Node) -> MitsubaResult<()> {
        let kind = self.resolve(node, "type")?;
        self.scene.integrator = IntegratorKind::from_name(&kind).unwrap_or_else(|| {
            log::warn!(
                "Line {}: integrator '{}' is not supported, using path",
                line(node),
                kind
            );
            IntegratorKind::Path
        });

        if let Some(depth) = property(node, "integer", "max_depth") {
            self.scene.max_depth = match self.integer(depth)? {
                -1 => UNBOUNDED_DEPTH,
                value => u32::try_from(value).map_err(|_| invalid(depth, value.to_string()))?,
            };
        }
        Ok(())
    }

    fn sensor(&mut self, node: Node) -> MitsubaResult<()> {
        let kind = self.resolve(node, "type")?;
        if kind != "perspective" {
            log::warn!("Line {}: sensor '{}' treated as perspective", line(node), kind);
        }

        let mut to_world = Mat4::IDENTITY;
        let mut fov = None;
        let mut fov_axis = FovAxis::Horizontal;

        for child in elements(node) {
            match (child.tag_name().name(), child.attribute("name")) {
                ("float", Some("fov")) => fov = Some(self.float(child)?),
                ("string", Some("fov_axis")) => {
                    let axis = self.resolve(child, "value")?;
                    fov_axis = match axis.as_str() {
                        "x" => FovAxis::Horizontal,
                        "y" => FovAxis::Vertical,
                        "smaller" => FovAxis::Shorter,
                        "larger" => FovAxis::Larger,
                        "diagonal" => FovAxis::Diagonal,
                        _ => return Err(invalid(child, axis.clone())),
                    };
                }
                ("transform", Some("to_world")) => to_world = self.transform(child)?,
                ("sampler", _) => {
                    if let Some(count) = property(child, "integer", "sample_count") {
                        self.scene.samples = self.count(count)?;
                    }
                }
                ("film", _) => {
                    if let Some(width) = property(child, "integer", "width") {
                        self.scene.width = self.count(width)?;
                    }
                    if let Some(height) = property(child, "integer", "height") {
                        self.scene.height = self.count(height)?;
                    }
                }
                (tag, name) => {
                    log::debug!("Line {}: ignoring sensor <{}> {:?}", line(child), tag, name)
                }
            }
        }

        let fov = fov.ok_or_else(|| MitsubaError::Invalid {
            line: line(node),
            message: "sensor has no fov".to_string(),
        })?;
        // Mitsuba cameras look down +Z with +X to the left of the image;
        // ours look down -Z with +X to the right.
        let flip = Mat4::from_scale(Vec3::new(-1.0, 1.0, -1.0));
        self.scene.camera = CameraDesc {
            model: to_world * flip,
            fov,
            fov_axis,
        };
        Ok(())
    }

    /// A `<bsdf>` element. `twosided` wraps another BSDF.
    fn material(&self, node: Node) -> MitsubaResult<MaterialDesc> {
        let kind = self.resolve(node, "type")?;
        if kind == "twosided" {
            return match elements(node).find(|c| c.has_tag_name("bsdf")) {
                Some(inner) => self.material(inner),
                None => Ok(MaterialDesc::default()),
            };
        }
        if kind != "diffuse" {
            log::warn!("Line {}: BSDF '{}' rendered as diffuse", line(node), kind);
        }

        let reflectance = elements(node).find(|c| c.attribute("name") == Some("reflectance"));
        match reflectance {
            Some(child) if child.has_tag_name("rgb") || child.has_tag_name("float") => {
                Ok(MaterialDesc::Diffuse {
                    reflectance: self.color(child)?,
                })
            }
            Some(child) => {
                log::warn!(
                    "Line {}: <{}> reflectance is not supported, using the default",
                    line(child),
                    child.tag_name().name()
                );
                Ok(MaterialDesc::default())
            }
            None => Ok(MaterialDesc::default()),
        }
    }

    fn emitter(&self, node: Node) -> MitsubaResult<Option<Emission>> {
        let kind = self.resolve(node, "type")?;
        if kind != "area" {
            log::warn!("Line {}: skipping '{}' emitter on a shape", line(node), kind);
            return Ok(None);
        }
        let radiance = match elements(node).find(|c| c.attribute("name") == Some("radiance")) {
            Some(child) => self.color(child)?,
            None => Vec3::ONE,
        };
        Ok(Some(Emission::new(radiance, 1.0)))
    }

    fn shape(&mut self, node: Node) -> MitsubaResult<()> {
        let kind = self.resolve(node, "type")?;
        let mut mesh = match kind.as_str() {
            "rectangle" => rectangle(),
            "cube" => cube(),
            other => {
                log::warn!("Line {}: skipping unsupported shape '{}'", line(node), other);
                return Ok(());
            }
        };

        let mut to_world = Mat4::IDENTITY;
        let mut material = None;
        let mut emission = None;

        for child in elements(node) {
            match child.tag_name().name() {
                "transform" if child.attribute("name") == Some("to_world") => {
                    to_world = self.transform(child)?;
                }
                "ref" => {
                    let id = self.resolve(child, "id")?;
                    let found = self.bsdfs.get(&id).copied();
                    material = Some(found.ok_or_else(|| MitsubaError::UnknownBsdf {
                        id,
                        line: line(child),
                    })?);
                }
                "bsdf" => material = Some(self.material(child)?),
                "emitter" => emission = self.emitter(child)?,
                "boolean" if child.attribute("name") == Some("flip_normals") => {
                    if self.resolve(child, "value")? == "true" {
                        mesh = mesh.flipped();
                    }
                }
                tag => log::debug!("Line {}: ignoring shape <{}>", line(child), tag),
            }
        }

        let name = match node.attribute("id") {
            Some(id) => id.to_string(),
            None => format!("{}_{}", kind, self.scene.shapes.len()),
        };
        self.scene.add_shape(Shape {
            name,
            mesh: mesh.transformed(&to_world),
            material: material.unwrap_or_default(),
            emission,
        });
        Ok(())
    }
}

/// Element children of `node`.
fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

/// First `<tag name="name">` child.
fn property<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    elements(node).find(|c| c.has_tag_name(tag) && c.attribute("name") == Some(name))
}

fn attribute<'a>(node: Node<'a, '_>, name: &'static str) -> MitsubaResult<&'a str> {
    node.attribute(name)
        .ok_or_else(|| MitsubaError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: name,
            line: line(node),
        })
}

/// 1-based source line of `node`.
fn line(node: Node) -> u32 {
    node.document().text_pos_at(node.range().start).row
}

fn invalid(node: Node, value: String) -> MitsubaError {
    MitsubaError::InvalidValue {
        name: node
            .attribute("name")
            .unwrap_or_else(|| node.tag_name().name())
            .to_string(),
        value,
        line: line(node),
    }
}

/// Mitsuba's lookat: to-world matrix with columns `left = up x dir`,
/// `up`, `dir` and `origin`.
fn look_at(origin: Vec3, target: Vec3, up: Vec3) -> Option<Mat4> {
    let dir = (target - origin).try_normalize()?;
    let left = up.try_normalize()?.cross(dir).try_normalize()?;
    let new_up = dir.cross(left);
    Some(Mat4::from_cols(
        left.extend(0.0),
        new_up.extend(0.0),
        dir.extend(0.0),
        origin.extend(1.0),
    ))
}

/// The `[-1, 1]^2` square in the z=0 plane, facing +Z.
fn rectangle() -> Mesh {
    Mesh::quad(
        Vec3::new(-1.0, -1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(-1.0, 1.0, 0.0),
    )
}

/// The `[-1, 1]^3` cube with outward faces.
fn cube() -> Mesh {
    let mut positions = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for axis in Vec3::AXES {
        for normal in [axis, -axis] {
            let u = Vec3::new(normal.z.abs(), normal.x.abs(), normal.y.abs());
            // u x v == normal
            let v = normal.cross(u);
            let base = positions.len() as u32;
            positions.extend([
                normal - u - v,
                normal + u - v,
                normal + u + v,
                normal - u + v,
            ]);
            indices.extend([0, 1, 2, 2, 3, 0].map(|i| base + i));
        }
    }
    Mesh::new(positions, indices)
}
