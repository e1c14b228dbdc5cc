// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fs;
use std::path::{ Path, PathBuf };
use std::str::FromStr;
use std::sync::Arc;

use quick_xml::events::{ BytesStart, Event };
use quick_xml::Reader;
use thiserror::Error;

use crate::core::bsdf::BSDF;
use crate::core::scene::{ Scene, SceneBuilder, SceneError, SceneObject };
use crate::core::shape::Shape;
use crate::integrators::path::{ ConfigError, PathConfig };
use crate::io::obj_utils::ObjLoadError;
use crate::materials::lambertian_diffuse::{ HemisphereSampling, LambertianDiffuseBSDF };
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;
use crate::sensors::perspective::PerspectiveCamera;
use crate::shapes::sphere::Sphere;
use crate::shapes::triangle::Triangle;
use crate::shapes::triangle_mesh::TriangleMesh;

#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error("failed to read scene: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed scene xml: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("{0}")]
    Parse(String),
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error(transparent)]
    Obj(#[from] ObjLoadError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Everything a scene file describes.
pub struct SceneLoadResult {
    pub scene: Scene,
    pub sensor: PerspectiveCamera,
    pub config: PathConfig,
    pub seed: u64,
}

pub fn load_scene_with_settings<P: AsRef<Path>>(path: P) -> Result<SceneLoadResult, SceneLoadError> {
    let path = path.as_ref();
    log::info!("Loading scene from {}.", path.display());
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    load_scene_from_str(&xml, base_dir)
}

/// Parses a scene document; relative mesh paths resolve against `base_dir`.
pub fn load_scene_from_str(xml: &str, base_dir: &Path) -> Result<SceneLoadResult, SceneLoadError> {
    let root = parse_tree(xml)?;
    if root.name != "scene" {
        return Err(SceneLoadError::Parse(format!("root element must be <scene>, found <{}>", root.name)));
    }

    let mut loader = SceneLoader::new(base_dir);
    for child in root.children.iter().filter(|c| c.name == "default") {
        loader.add_default(child)?;
    }
    loader.load(&root)
}

#[derive(Debug)]
struct XmlNode {
    name: String,
    attrs: HashMap<String, String>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn from_start(e: &BytesStart) -> Result<Self, SceneLoadError> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut attrs = HashMap::new();
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            attrs.insert(key, attr.unescape_value()?.into_owned());
        }
        Ok(Self { name, attrs, children: Vec::new() })
    }

    /// Child property such as `<float name="radius" .../>`.
    fn property(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter()
            .find(|c| c.name != "ref" && c.attrs.get("name").map(String::as_str) == Some(name))
    }
}

fn parse_tree(xml: &str) -> Result<XmlNode, SceneLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    fn attach(node: XmlNode, stack: &mut Vec<XmlNode>, root: &mut Option<XmlNode>) -> Result<(), SceneLoadError> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None if root.is_none() => *root = Some(node),
            None => return Err(SceneLoadError::Parse("multiple root elements".to_string())),
        }
        Ok(())
    }

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => stack.push(XmlNode::from_start(&e)?),
            Event::Empty(e) => attach(XmlNode::from_start(&e)?, &mut stack, &mut root)?,
            Event::End(_) => {
                let node = stack.pop()
                    .ok_or_else(|| SceneLoadError::Parse("unbalanced closing tag".to_string()))?;
                attach(node, &mut stack, &mut root)?;
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(SceneLoadError::Parse(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| SceneLoadError::Parse("empty scene document".to_string()))
}

struct SceneLoader {
    base_dir: PathBuf,
    defaults: HashMap<String, String>,
    bsdfs: HashMap<String, Arc<dyn BSDF>>,
}

impl SceneLoader {
    fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            defaults: HashMap::new(),
            bsdfs: HashMap::new(),
        }
    }

    fn add_default(&mut self, node: &XmlNode) -> Result<(), SceneLoadError> {
        let name = node.attrs.get("name").ok_or(SceneLoadError::MissingField("default.name"))?;
        let value = node.attrs.get("value").ok_or(SceneLoadError::MissingField("default.value"))?;
        self.defaults.insert(name.clone(), value.clone());
        Ok(())
    }

    /// Attribute value with `$name` references replaced by `<default>` values.
    fn attr(&self, node: &XmlNode, key: &str) -> Option<String> {
        node.attrs.get(key).map(|raw| self.substitute(raw))
    }

    // A reference spans the longest run of identifier characters after `$`.
    // Unknown names are kept verbatim.
    fn substitute(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(start) = rest.find('$') {
            out.push_str(&rest[..start]);
            let tail = &rest[start + 1..];
            let len = tail.find(|c: char| !(c.is_alphanumeric() || c == '_')).unwrap_or(tail.len());
            match self.defaults.get(&tail[..len]) {
                Some(value) if len > 0 => out.push_str(value),
                _ => {
                    out.push('$');
                    out.push_str(&tail[..len]);
                }
            }
            rest = &tail[len..];
        }
        out.push_str(rest);
        out
    }

    fn value(&self, node: &XmlNode, field: &'static str) -> Result<String, SceneLoadError> {
        self.attr(node, "value").ok_or(SceneLoadError::MissingField(field))
    }

    fn float_property(&self, node: &XmlNode, name: &str) -> Result<Option<Float>, SceneLoadError> {
        node.property(name).map(|p| parse_float(&self.value(p, "value")?)).transpose()
    }

    fn rgb_property(&self, node: &XmlNode, name: &str) -> Result<Option<RGBSpectrum>, SceneLoadError> {
        node.property(name)
            .map(|p| parse_vec3(&self.value(p, "value")?).map(RGBSpectrum::from_vector))
            .transpose()
    }

    /// `<point name=... value="x, y, z"/>` or the `x`/`y`/`z` attribute form.
    fn point_property(&self, node: &XmlNode, name: &str) -> Result<Option<Vector3f>, SceneLoadError> {
        match node.property(name) {
            Some(p) => self.vector(p).map(Some),
            None => Ok(None),
        }
    }

    fn vector(&self, node: &XmlNode) -> Result<Vector3f, SceneLoadError> {
        if let Some(value) = self.attr(node, "value") {
            return parse_vec3(&value);
        }
        let axis = |key: &str| self.attr(node, key).map_or(Ok(0.0), |v| parse_float(&v));
        Ok(Vector3f::new(axis("x")?, axis("y")?, axis("z")?))
    }

    fn load(&mut self, root: &XmlNode) -> Result<SceneLoadResult, SceneLoadError> {
        let mut config = PathConfig::default();
        let mut seed = 0u64;
        let mut sensor = None;
        let mut builder = SceneBuilder::new();

        for child in &root.children {
            match child.name.as_str() {
                "default" => {}
                "integrator" => seed = self.load_integrator(child, &mut config)?.unwrap_or(seed),
                "sensor" => sensor = Some(self.load_sensor(child)?),
                "bsdf" => self.load_bsdf(child)?,
                "shape" => {
                    builder.add_object(self.load_shape(child)?);
                }
                other => log::warn!("Ignoring unsupported element <{}>.", other),
            }
        }

        config.validate()?;
        let sensor = sensor.ok_or(SceneLoadError::MissingField("sensor"))?;
        let scene = builder.build()?;
        log::info!("Scene loaded: {} objects, {} emitters, {} spp, max depth {}.",
                   scene.len(), scene.emitters().len(), config.samples_per_pixel, config.max_depth);

        Ok(SceneLoadResult { scene, sensor, config, seed })
    }

    /// Fills `config` from the integrator block; returns the seed if one is given.
    fn load_integrator(&self, node: &XmlNode, config: &mut PathConfig) -> Result<Option<u64>, SceneLoadError> {
        let kind = self.attr(node, "type").ok_or(SceneLoadError::MissingField("integrator.type"))?;
        if kind != "path" {
            return Err(SceneLoadError::Parse(format!("unsupported integrator: {}", kind)));
        }

        let mut seed = None;
        for param in &node.children {
            let name = match self.attr(param, "name") {
                Some(name) => name,
                None => continue,
            };
            let value = self.value(param, "integrator parameter value")?;
            match name.as_str() {
                "max_depth" => config.max_depth = parse_integer(&value)?,
                "spp" | "samples_per_pixel" => config.samples_per_pixel = parse_integer(&value)?,
                "rr" | "russian_roulette" => config.russian_roulette = parse_float(&value)?,
                "epsilon" => config.epsilon = parse_float(&value)?,
                "occlusion_tolerance" => config.occlusion_tolerance = parse_float(&value)?,
                "ray_epsilon" => config.ray_epsilon = parse_float(&value)?,
                "seed" => seed = Some(parse_integer(&value)?),
                other => log::warn!("Ignoring unknown integrator parameter `{}`.", other),
            }
        }
        Ok(seed)
    }

    fn load_sensor(&self, node: &XmlNode) -> Result<PerspectiveCamera, SceneLoadError> {
        let kind = self.attr(node, "type").unwrap_or_else(|| "perspective".to_string());
        if kind != "perspective" {
            return Err(SceneLoadError::Parse(format!("unsupported sensor: {}", kind)));
        }

        // Film and transform wrappers are accepted but carry no extra meaning.
        let mut params: Vec<&XmlNode> = Vec::new();
        for child in &node.children {
            match child.name.as_str() {
                "film" | "transform" => params.extend(child.children.iter()),
                _ => params.push(child),
            }
        }

        let mut fov: Float = 40.0;
        let mut width = 256usize;
        let mut height = 256usize;
        let mut lookat = None;
        for param in params {
            if param.name == "lookat" {
                let field = |key: &'static str| -> Result<Vector3f, SceneLoadError> {
                    parse_vec3(&self.attr(param, key).ok_or(SceneLoadError::MissingField(key))?)
                };
                let up = match self.attr(param, "up") {
                    Some(up) => parse_vec3(&up)?,
                    None => Vector3f::new(0.0, 1.0, 0.0),
                };
                lookat = Some((field("origin")?, field("target")?, up));
                continue;
            }
            match self.attr(param, "name").as_deref() {
                Some("fov") => fov = parse_float(&self.value(param, "fov")?)?,
                Some("width") => width = parse_integer(&self.value(param, "width")?)?,
                Some("height") => height = parse_integer(&self.value(param, "height")?)?,
                Some(other) => log::warn!("Ignoring sensor parameter `{}`.", other),
                None => log::warn!("Ignoring sensor element <{}>.", param.name),
            }
        }

        let (origin, target, up) = lookat.ok_or(SceneLoadError::MissingField("lookat"))?;
        if width == 0 || height == 0 {
            return Err(SceneLoadError::Parse(format!("film size must be positive, got {}x{}", width, height)));
        }
        Ok(PerspectiveCamera::new(origin, target, up, fov, width, height))
    }

    fn load_bsdf(&mut self, node: &XmlNode) -> Result<(), SceneLoadError> {
        let id = self.attr(node, "id").ok_or(SceneLoadError::MissingField("bsdf.id"))?;
        let bsdf = self.parse_bsdf(node)?;
        log::debug!("Registered bsdf `{}`.", id);
        self.bsdfs.insert(id, bsdf);
        Ok(())
    }

    fn parse_bsdf(&self, node: &XmlNode) -> Result<Arc<dyn BSDF>, SceneLoadError> {
        let kind = self.attr(node, "type").unwrap_or_else(|| "diffuse".to_string());
        if kind != "diffuse" {
            return Err(SceneLoadError::Parse(format!("unsupported bsdf: {}", kind)));
        }

        let reflectance = self.rgb_property(node, "reflectance")?.unwrap_or_else(|| RGBSpectrum::splat(0.5));
        let mut bsdf = LambertianDiffuseBSDF::new(reflectance);
        if let Some(radiance) = self.rgb_property(node, "radiance")? {
            bsdf = bsdf.with_emission(radiance);
        }
        if let Some(sampling) = node.property("sampling") {
            let sampling = match self.value(sampling, "sampling")?.as_str() {
                "uniform" => HemisphereSampling::Uniform,
                "cosine" => HemisphereSampling::Cosine,
                other => return Err(SceneLoadError::Parse(format!("unknown hemisphere sampling: {}", other))),
            };
            bsdf = bsdf.with_sampling(sampling);
        }
        Ok(Arc::new(bsdf))
    }

    fn shape_bsdf(&self, node: &XmlNode) -> Result<Arc<dyn BSDF>, SceneLoadError> {
        if let Some(inline) = node.children.iter().find(|c| c.name == "bsdf") {
            return self.parse_bsdf(inline);
        }
        let reference = node.children.iter()
            .find(|c| c.name == "ref")
            .and_then(|r| self.attr(r, "id"))
            .ok_or(SceneLoadError::MissingField("shape bsdf"))?;
        self.bsdfs.get(&reference)
            .cloned()
            .ok_or_else(|| SceneLoadError::Parse(format!("unknown bsdf reference: {}", reference)))
    }

    fn required_point(&self, node: &XmlNode, name: &'static str) -> Result<Vector3f, SceneLoadError> {
        self.point_property(node, name)?.ok_or(SceneLoadError::MissingField(name))
    }

    fn load_shape(&self, node: &XmlNode) -> Result<SceneObject, SceneLoadError> {
        let kind = self.attr(node, "type").ok_or(SceneLoadError::MissingField("shape.type"))?;
        let shape: Arc<dyn Shape> = match kind.as_str() {
            "obj" => {
                let filename = node.property("filename")
                    .map(|p| self.value(p, "filename"))
                    .transpose()?
                    .ok_or(SceneLoadError::MissingField("filename"))?;
                let (scale, translate) = self.mesh_transform(node)?;
                Arc::new(TriangleMesh::from_obj(self.base_dir.join(filename), &scale, &translate)?)
            }
            "sphere" => {
                let center = self.point_property(node, "center")?.unwrap_or_else(Vector3f::zeros);
                let radius = self.float_property(node, "radius")?.unwrap_or(1.0);
                if !(radius > 0.0) {
                    return Err(SceneLoadError::Parse(format!("sphere radius must be positive, got {}", radius)));
                }
                Arc::new(Sphere::new(center, radius))
            }
            "rectangle" => Arc::new(TriangleMesh::quad(self.required_point(node, "p0")?,
                                                       self.required_point(node, "p1")?,
                                                       self.required_point(node, "p2")?,
                                                       self.required_point(node, "p3")?)),
            "triangle" => Arc::new(Triangle::new(self.required_point(node, "p0")?,
                                                 self.required_point(node, "p1")?,
                                                 self.required_point(node, "p2")?)),
            other => return Err(SceneLoadError::Parse(format!("unsupported shape: {}", other))),
        };

        let object = SceneObject::new(shape, self.shape_bsdf(node)?);
        let object = match self.attr(node, "id") {
            Some(id) => object.with_name(id),
            None => object,
        };
        log::debug!("Loaded {} shape {:?} (emissive: {}).", kind, object.name(), object.has_emit());
        Ok(object)
    }

    /// Scale and translation for a mesh, given directly or inside `<transform>`.
    fn mesh_transform(&self, node: &XmlNode) -> Result<(Vector3f, Vector3f), SceneLoadError> {
        let mut scale = Vector3f::new(1.0, 1.0, 1.0);
        let mut translate = Vector3f::zeros();

        let elements = node.children.iter()
            .flat_map(|c| -> Vec<&XmlNode> {
                if c.name == "transform" { c.children.iter().collect() } else { vec![c] }
            });
        for element in elements {
            match element.name.as_str() {
                "translate" => translate += self.vector(element)?,
                "scale" => {
                    let s = match self.attr(element, "value") {
                        Some(v) if v.contains(',') => parse_vec3(&v)?,
                        Some(v) => Vector3f::repeat(parse_float(&v)?),
                        None => {
                            let axis = |key: &str| self.attr(element, key).map_or(Ok(1.0), |v| parse_float(&v));
                            Vector3f::new(axis("x")?, axis("y")?, axis("z")?)
                        }
                    };
                    scale.component_mul_assign(&s);
                }
                _ => {}
            }
        }
        Ok((scale, translate))
    }
}

fn parse_float(value: &str) -> Result<Float, SceneLoadError> {
    value.trim().parse::<Float>().map_err(|_| SceneLoadError::Parse(format!("invalid float: {}", value)))
}

/// Parses into the target width directly, so out-of-range values are errors.
fn parse_integer<T: FromStr>(value: &str) -> Result<T, SceneLoadError> {
    value.trim().parse::<T>().map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_vec3(value: &str) -> Result<Vector3f, SceneLoadError> {
    let parts: Vec<&str> = value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
    if parts.len() != 3 {
        return Err(SceneLoadError::Parse(format!("expected three comma separated values: {}", value)));
    }
    Ok(Vector3f::new(parse_float(parts[0])?, parse_float(parts[1])?, parse_float(parts[2])?))
}
