// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{ Path, PathBuf };

use quick_xml::events::{ BytesStart, Event };
use quick_xml::Reader;

use crate::core::mesh::Mesh;
use crate::core::tangent_space::{ DegeneratePolicy, TangentSpaceBuilder };
use crate::io::obj_utils::{ load_mesh_from_obj, ObjLoadError };
use crate::io::ply_utils::{ load_mesh_from_ply, PlyLoadError };
use crate::math::constants::{ Float, Vector3f };
use crate::shapes::{ circle, cube, quad, sphere, SphereParams };

#[derive(Debug)]
pub enum BatchLoadError {
    Io(std::io::Error),
    Parse(String),
    MissingField(&'static str),
    Obj(ObjLoadError),
    Ply(PlyLoadError),
}

impl From<std::io::Error> for BatchLoadError {
    fn from(err: std::io::Error) -> Self {
        BatchLoadError::Io(err)
    }
}

impl From<ObjLoadError> for BatchLoadError {
    fn from(err: ObjLoadError) -> Self {
        BatchLoadError::Obj(err)
    }
}

impl From<PlyLoadError> for BatchLoadError {
    fn from(err: PlyLoadError) -> Self {
        BatchLoadError::Ply(err)
    }
}

impl fmt::Display for BatchLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchLoadError::Io(err) => write!(f, "io error: {}", err),
            BatchLoadError::Parse(msg) => write!(f, "parse error: {}", msg),
            BatchLoadError::MissingField(field) => write!(f, "missing field: {}", field),
            BatchLoadError::Obj(err) => write!(f, "obj: {}", err),
            BatchLoadError::Ply(err) => write!(f, "ply: {}", err),
        }
    }
}

impl std::error::Error for BatchLoadError {}

#[derive(Debug, Clone, PartialEq)]
pub enum MeshSource {
    Obj(PathBuf),
    Ply(PathBuf),
    Quad,
    Cube,
    Sphere(SphereParams),
    Circle { segments: u32, radius: Float },
}

/// One `<mesh>` entry of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshJob {
    pub id: Option<String>,
    pub source: MeshSource,
    pub output: Option<PathBuf>,
    pub scale: Vector3f,
    pub translate: Vector3f,
    /// Drop tangents shipped with the source so they are rebuilt.
    pub recompute_tangents: bool,
}

impl MeshJob {
    fn new(source: MeshSource) -> Self {
        Self {
            id: None,
            source,
            output: None,
            scale: Vector3f::new(1.0, 1.0, 1.0),
            translate: Vector3f::zeros(),
            recompute_tangents: false,
        }
    }

    pub fn load_mesh(&self) -> Result<Mesh, BatchLoadError> {
        let mut mesh = match &self.source {
            MeshSource::Obj(path) => load_mesh_from_obj(path)?,
            MeshSource::Ply(path) => load_mesh_from_ply(path)?,
            MeshSource::Quad => quad(),
            MeshSource::Cube => cube(),
            MeshSource::Sphere(params) => sphere(params),
            MeshSource::Circle { segments, radius } => circle(*segments, *radius),
        };

        if let Some(id) = &self.id {
            mesh = mesh.with_name(id.clone());
        }
        if self.recompute_tangents {
            mesh.strip_tangents();
        }
        if self.scale != Vector3f::new(1.0, 1.0, 1.0) || self.translate != Vector3f::zeros() {
            mesh.apply_transform(&self.scale, &self.translate);
        }
        Ok(mesh)
    }
}

/// Builder settings from the `<tangent_space>` block. Unset fields keep the
/// builder defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TangentSpaceSettings {
    pub epsilon: Option<Float>,
    pub degenerate_policy: Option<DegeneratePolicy>,
    pub threads: Option<usize>,
    pub unique_edges: bool,
}

impl TangentSpaceSettings {
    pub fn builder(&self) -> TangentSpaceBuilder {
        let mut builder = TangentSpaceBuilder::new();
        if let Some(epsilon) = self.epsilon {
            builder = builder.with_epsilon(epsilon);
        }
        if let Some(policy) = self.degenerate_policy {
            builder = builder.with_degenerate_policy(policy);
        }
        if let Some(threads) = self.threads {
            builder = builder.with_threads(threads);
        }
        builder
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub base_dir: PathBuf,
    pub settings: TangentSpaceSettings,
    pub jobs: Vec<MeshJob>,
}

pub fn load_batch<P: AsRef<Path>>(path: P) -> Result<Batch, BatchLoadError> {
    let path = path.as_ref();
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    log::info!("Starting reading batch: {}.", path.display());
    parse_batch(&xml, base_dir)
}


// Where typed properties (`<string>`, `<float>`, ...) are routed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Section {
    Root,
    Mesh,
    Transform,
    TangentSpace,
}

#[derive(Default)]
struct PendingMesh {
    kind: String,
    id: Option<String>,
    filename: Option<String>,
    output: Option<String>,
    integers: HashMap<String, i64>,
    floats: HashMap<String, Float>,
    booleans: HashMap<String, bool>,
    scale: Option<Vector3f>,
    translate: Vector3f,
}

impl PendingMesh {
    fn integer(&self, name: &str, default: u32) -> Result<u32, BatchLoadError> {
        match self.integers.get(name) {
            Some(v) => u32::try_from(*v)
                .map_err(|_| BatchLoadError::Parse(format!("{} out of range: {}", name, v))),
            None => Ok(default),
        }
    }

    fn float(&self, name: &str, default: Float) -> Float {
        self.floats.get(name).copied().unwrap_or(default)
    }

    fn boolean(&self, name: &str) -> bool {
        self.booleans.get(name).copied().unwrap_or(false)
    }

    fn finish(self, base_dir: &Path) -> Result<MeshJob, BatchLoadError> {
        let source = match self.kind.as_str() {
            "obj" | "ply" => {
                let filename = self.filename.as_deref().ok_or(BatchLoadError::MissingField("mesh.filename"))?;
                let path = resolve_path(base_dir, filename);
                if self.kind == "obj" { MeshSource::Obj(path) } else { MeshSource::Ply(path) }
            }
            "quad" => MeshSource::Quad,
            "cube" => MeshSource::Cube,
            "sphere" => {
                let d = SphereParams::default();
                MeshSource::Sphere(SphereParams {
                    height_segments: self.integer("height_segments", d.height_segments)?,
                    width_segments: self.integer("width_segments", d.width_segments)?,
                    radius: self.float("radius", d.radius),
                    flip: self.boolean("flip"),
                })
            }
            "circle" => MeshSource::Circle {
                segments: self.integer("segments", 12)?,
                radius: self.float("radius", 1.0),
            },
            other => return Err(BatchLoadError::Parse(format!("unknown mesh type: {}", other))),
        };

        let mut job = MeshJob::new(source);
        job.id = self.id.clone();
        job.output = self.output.as_deref().map(|o| resolve_path(base_dir, o));
        job.scale = self.scale.unwrap_or(job.scale);
        job.translate = self.translate;
        job.recompute_tangents = self.boolean("recompute_tangents");
        Ok(job)
    }
}

struct BatchParser<'a> {
    base_dir: &'a Path,
    defaults: HashMap<String, String>,
    section: Section,
    seen_root: bool,
    pending: Option<PendingMesh>,
    settings: TangentSpaceSettings,
    jobs: Vec<MeshJob>,
}

impl<'a> BatchParser<'a> {
    fn new(base_dir: &'a Path) -> Self {
        Self {
            base_dir,
            defaults: HashMap::new(),
            section: Section::Root,
            seen_root: false,
            pending: None,
            settings: TangentSpaceSettings::default(),
            jobs: Vec::new(),
        }
    }

    fn open(&mut self, e: &BytesStart) -> Result<(), BatchLoadError> {
        let attrs = attributes(e, &self.defaults);
        match e.name().as_ref() {
            b"batch" => {
                self.seen_root = true;
            }
            b"default" => {
                if let (Some(k), Some(v)) = (attrs.get("name"), attrs.get("value")) {
                    self.defaults.insert(k.clone(), v.clone());
                }
            }
            b"mesh" => {
                let kind = attrs.get("type").cloned().ok_or(BatchLoadError::MissingField("mesh.type"))?;
                self.pending = Some(PendingMesh { kind, id: attrs.get("id").cloned(), ..PendingMesh::default() });
                self.section = Section::Mesh;
            }
            b"tangent_space" => {
                self.section = Section::TangentSpace;
            }
            b"transform" => {
                if self.section == Section::Mesh {
                    self.section = Section::Transform;
                }
            }
            tag @ (b"scale" | b"translate") => {
                if let (Section::Transform, Some(mesh)) = (self.section, self.pending.as_mut()) {
                    let is_scale = tag == b"scale";
                    let v = if let Some(u) = attrs.get("value") {
                        let u = parse_float(u)?;
                        Vector3f::new(u, u, u)
                    } else {
                        let fill = if is_scale { 1.0 } else { 0.0 };
                        Vector3f::new(optional_float(&attrs, "x")?.unwrap_or(fill),
                                      optional_float(&attrs, "y")?.unwrap_or(fill),
                                      optional_float(&attrs, "z")?.unwrap_or(fill))
                    };
                    if is_scale {
                        let scale = mesh.scale.unwrap_or_else(|| Vector3f::new(1.0, 1.0, 1.0));
                        mesh.scale = Some(scale.component_mul(&v));
                    } else {
                        mesh.translate += v;
                    }
                }
            }
            tag @ (b"string" | b"integer" | b"float" | b"boolean") => {
                let name = attrs.get("name").cloned().ok_or(BatchLoadError::MissingField("property.name"))?;
                let value = attrs.get("value").cloned().ok_or(BatchLoadError::MissingField("property.value"))?;
                match (self.section, self.pending.as_mut()) {
                    (Section::Mesh, Some(mesh)) => set_mesh_property(mesh, tag, name, value)?,
                    (Section::TangentSpace, _) => set_tangent_space_property(&mut self.settings, &name, &value)?,
                    _ => log::warn!("Ignoring property {} outside of a mesh or tangent_space block.", name),
                }
            }
            other => {
                log::debug!("Ignoring unknown batch element: {}.", String::from_utf8_lossy(other));
            }
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) -> Result<(), BatchLoadError> {
        match name {
            b"mesh" => {
                if let Some(mesh) = self.pending.take() {
                    self.jobs.push(mesh.finish(self.base_dir)?);
                }
                self.section = Section::Root;
            }
            b"transform" => {
                if self.section == Section::Transform {
                    self.section = Section::Mesh;
                }
            }
            b"tangent_space" => {
                self.section = Section::Root;
            }
            _ => {}
        }
        Ok(())
    }
}

pub fn parse_batch(xml: &str, base_dir: &Path) -> Result<Batch, BatchLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut parser = BatchParser::new(base_dir);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => parser.open(&e)?,
            Ok(Event::Empty(e)) => {
                parser.open(&e)?;
                parser.close(e.name().as_ref())?;
            }
            Ok(Event::End(e)) => parser.close(e.name().as_ref())?,
            Err(e) => {
                return Err(BatchLoadError::Parse(e.to_string()));
            }
            _ => {}
        }

        buf.clear();
    }

    if !parser.seen_root {
        return Err(BatchLoadError::MissingField("batch"));
    }

    log::info!("Batch parsed: {} meshes.", parser.jobs.len());
    Ok(Batch { base_dir: base_dir.to_path_buf(), settings: parser.settings, jobs: parser.jobs })
}

fn set_mesh_property(mesh: &mut PendingMesh, tag: &[u8], name: String, value: String) -> Result<(), BatchLoadError> {
    match tag {
        b"string" => match name.as_str() {
            "filename" => mesh.filename = Some(value),
            "output" => mesh.output = Some(value),
            _ => log::warn!("Ignoring unknown mesh string: {}.", name),
        },
        b"integer" => {
            let v = value.parse::<i64>()
                .map_err(|_| BatchLoadError::Parse(format!("invalid integer: {}", value)))?;
            mesh.integers.insert(name, v);
        }
        b"float" => {
            let v = parse_float(&value)?;
            mesh.floats.insert(name, v);
        }
        _ => {
            let v = parse_bool(&value)?;
            mesh.booleans.insert(name, v);
        }
    }
    Ok(())
}

fn set_tangent_space_property(settings: &mut TangentSpaceSettings, name: &str, value: &str) -> Result<(), BatchLoadError> {
    match name {
        "epsilon" => settings.epsilon = Some(parse_float(value)?),
        "degenerate_policy" => {
            let policy = DegeneratePolicy::from_name(value)
                .ok_or_else(|| BatchLoadError::Parse(format!("unknown degenerate policy: {}", value)))?;
            settings.degenerate_policy = Some(policy);
        }
        "threads" => settings.threads = Some(parse_usize(value)?),
        "unique_edges" => settings.unique_edges = parse_bool(value)?,
        _ => log::warn!("Ignoring unknown tangent_space setting: {}.", name),
    }
    Ok(())
}

fn attributes(e: &BytesStart, defaults: &HashMap<String, String>) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        out.insert(key, resolve_value(&attr.unescape_value().unwrap_or_default(), defaults));
    }
    out
}

fn resolve_path(base_dir: &Path, filename: &str) -> PathBuf {
    if Path::new(filename).is_absolute() {
        PathBuf::from(filename)
    } else {
        base_dir.join(filename)
    }
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn optional_float(attrs: &HashMap<String, String>, key: &str) -> Result<Option<Float>, BatchLoadError> {
    attrs.get(key).map(|v| parse_float(v)).transpose()
}

fn parse_float(value: &str) -> Result<Float, BatchLoadError> {
    value.trim().parse::<Float>().map_err(|_| BatchLoadError::Parse(format!("invalid float: {}", value)))
}

fn parse_usize(value: &str) -> Result<usize, BatchLoadError> {
    value.trim().parse::<usize>().map_err(|_| BatchLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_bool(value: &str) -> Result<bool, BatchLoadError> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(BatchLoadError::Parse(format!("invalid boolean: {}", value))),
    }
}
