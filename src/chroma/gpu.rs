//! GPU chroma-key back end (feature `gpu`).
//!
//! A single wgpu compute pass over packed RGBA8 pixels in a storage buffer. The shader keeps
//! the legacy GPU threshold convention (`(1 - similarity) * 0.4`) and refines edges against all
//! eight neighbors by recomputing their base alphas inline, so no intermediate alpha plane is
//! needed.

use crate::chroma::colorspace::rgb_to_ycbcr;
use crate::chroma::{ChromaKeyParams, ChromaKeyer, check_dims};
use crate::foundation::error::{GreenroomError, GreenroomResult};

const WORKGROUP_SIZE: u32 = 8;

const KEY_SHADER: &str = r#"
struct Params {
  width: u32,
  height: u32,
  key_dominant: u32,
  _pad: u32,
  key_cb: f32,
  key_cr: f32,
  similarity: f32,
  smoothness: f32,
  spill: f32,
};

@group(0) @binding(0) var<storage, read> src: array<u32>;
@group(0) @binding(1) var<storage, read_write> dst: array<u32>;
@group(0) @binding(2) var<uniform> params: Params;

fn unpack_rgb(p: u32) -> vec3<f32> {
  return vec3<f32>(
    f32(p & 0xffu),
    f32((p >> 8u) & 0xffu),
    f32((p >> 16u) & 0xffu),
  ) / 255.0;
}

fn base_alpha(rgb: vec3<f32>) -> f32 {
  let cb = -0.168736 * rgb.r - 0.331264 * rgb.g + 0.5 * rgb.b + 0.5;
  let cr = 0.5 * rgb.r - 0.418688 * rgb.g - 0.081312 * rgb.b + 0.5;
  let d = length(vec2<f32>(cb - params.key_cb, cr - params.key_cr));
  let threshold = (1.0 - params.similarity) * 0.4;
  if (d >= threshold) {
    return 1.0;
  }
  let lo = threshold * (1.0 - params.smoothness);
  if (lo >= threshold) {
    return select(1.0, 0.0, d < threshold);
  }
  return smoothstep(lo, threshold, d);
}

@compute @workgroup_size(8, 8)
fn key_main(@builtin(global_invocation_id) gid: vec3<u32>) {
  if (gid.x >= params.width || gid.y >= params.height) {
    return;
  }
  let idx = gid.y * params.width + gid.x;
  var rgb = unpack_rgb(src[idx]);
  var a = base_alpha(rgb);

  var sum = 0.0;
  var count = 0.0;
  for (var dy = -1; dy <= 1; dy = dy + 1) {
    for (var dx = -1; dx <= 1; dx = dx + 1) {
      if (dx == 0 && dy == 0) {
        continue;
      }
      let nx = i32(gid.x) + dx;
      let ny = i32(gid.y) + dy;
      if (nx < 0 || ny < 0 || nx >= i32(params.width) || ny >= i32(params.height)) {
        continue;
      }
      sum = sum + base_alpha(unpack_rgb(src[u32(ny) * params.width + u32(nx)]));
      count = count + 1.0;
    }
  }
  if (count > 0.0) {
    let mean = sum / count;
    if (abs(mean - a) > 0.25) {
      a = mix(a, mean, 0.5);
    }
  }

  if (a > 0.1 && a < 0.9) {
    let dom = params.key_dominant;
    var c = rgb;
    var others = vec2<f32>(0.0, 0.0);
    if (dom == 0u) {
      others = vec2<f32>(c.g, c.b);
    } else if (dom == 1u) {
      others = vec2<f32>(c.r, c.b);
    } else {
      others = vec2<f32>(c.r, c.g);
    }
    let excess = c[dom] - max(others.x, others.y);
    if (excess > 0.0) {
      let cut = excess * (1.0 - a) * params.spill;
      c[dom] = clamp(c[dom] - cut, 0.0, 1.0);
      let add = cut * 0.25;
      if (dom == 0u) {
        c.g = clamp(c.g + add, 0.0, 1.0);
        c.b = clamp(c.b + add, 0.0, 1.0);
      } else if (dom == 1u) {
        c.r = clamp(c.r + add, 0.0, 1.0);
        c.b = clamp(c.b + add, 0.0, 1.0);
      } else {
        c.r = clamp(c.r + add, 0.0, 1.0);
        c.g = clamp(c.g + add, 0.0, 1.0);
      }
      rgb = c;
    }
  }
  if (a > 0.0 && a < 0.9) {
    let gray = dot(rgb, vec3<f32>(0.299, 0.587, 0.114));
    rgb = mix(rgb, vec3<f32>(gray), (1.0 - a) * 0.4);
  }

  let a8 = u32(floor(clamp(a, 0.0, 1.0) * 255.0));
  let premul = vec3<u32>(round(clamp(rgb, vec3<f32>(0.0), vec3<f32>(1.0)) * 255.0 * f32(a8) / 255.0));
  dst[idx] = premul.x | (premul.y << 8u) | (premul.z << 16u) | (a8 << 24u);
}
"#;

/// Compute-shader keyer. Construction fails when no adapter or device is available.
pub struct GpuKeyer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl GpuKeyer {
    /// Initialize an adapter, device and compute pipeline.
    pub fn new() -> GreenroomResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                GreenroomError::render("no gpu adapter available")
            }
            other => GreenroomError::render(format!("wgpu request_adapter failed: {other:?}")),
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("greenroom_chroma_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| GreenroomError::render(format!("wgpu request_device failed: {e:?}")))?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("greenroom_chroma_shader"),
            source: wgpu::ShaderSource::Wgsl(KEY_SHADER.into()),
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("greenroom_chroma_bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("greenroom_chroma_pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("greenroom_chroma_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("key_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
        })
    }

    fn encode_params(&self, params: &ChromaKeyParams, width: u32, height: u32) -> [u8; 36] {
        let (_, key_cb, key_cr) = rgb_to_ycbcr(
            f32::from(params.key_color.r) / 255.0,
            f32::from(params.key_color.g) / 255.0,
            f32::from(params.key_color.b) / 255.0,
        );
        let mut buf = [0u8; 36];
        buf[0..4].copy_from_slice(&width.to_le_bytes());
        buf[4..8].copy_from_slice(&height.to_le_bytes());
        buf[8..12].copy_from_slice(&(params.key_color_dominant() as u32).to_le_bytes());
        buf[16..20].copy_from_slice(&key_cb.to_le_bytes());
        buf[20..24].copy_from_slice(&key_cr.to_le_bytes());
        buf[24..28].copy_from_slice(&params.similarity.to_le_bytes());
        buf[28..32].copy_from_slice(&params.smoothness.to_le_bytes());
        buf[32..36].copy_from_slice(&params.spill_suppress.to_le_bytes());
        buf
    }
}

impl ChromaKeyer for GpuKeyer {
    fn key(
        &mut self,
        src_rgba8: &[u8],
        width: u32,
        height: u32,
        params: &ChromaKeyParams,
    ) -> GreenroomResult<Vec<u8>> {
        check_dims(src_rgba8.len(), width, height)?;
        params.validate()?;

        let byte_len = src_rgba8.len() as u64;
        let src_buf = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("greenroom_chroma_src"),
            size: byte_len,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let dst_buf = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("greenroom_chroma_dst"),
            size: byte_len,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("greenroom_chroma_staging"),
            size: byte_len,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let params_buf = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("greenroom_chroma_params"),
            size: 48,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        self.queue.write_buffer(&src_buf, 0, src_rgba8);
        self.queue
            .write_buffer(&params_buf, 0, &self.encode_params(params, width, height));

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("greenroom_chroma_bg"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: src_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: dst_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buf.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("greenroom_chroma_encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("greenroom_chroma_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(
                width.div_ceil(WORKGROUP_SIZE),
                height.div_ceil(WORKGROUP_SIZE),
                1,
            );
        }
        encoder.copy_buffer_to_buffer(&dst_buf, 0, &staging, 0, byte_len);
        self.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| GreenroomError::render(format!("wgpu poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| GreenroomError::render("keyer readback channel closed"))?
            .map_err(|e| GreenroomError::render(format!("keyer readback map failed: {e:?}")))?;

        let mapped = slice.get_mapped_range();
        let out = mapped.to_vec();
        drop(mapped);
        staging.unmap();
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "gpu"
    }
}
