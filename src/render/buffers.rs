use crate::{data_structures::mesh::MeshDocument, gpu::RenderBackend};

/// Creates one buffer set per material, in material order.
///
/// The vertex stream is the material's vertices reinterpreted as floats
/// (position then uv, five per vertex); indices are uploaded unchanged.
/// Materials without geometry still get a (empty) buffer set so the result
/// always lines up with `document.materials`.
pub fn upload_document<B: RenderBackend + ?Sized>(
    gpu: &mut B,
    label: &str,
    document: &MeshDocument,
) -> Vec<B::BufferSet> {
    document
        .materials
        .iter()
        .map(|material| {
            let vertex_data: &[f32] = bytemuck::cast_slice(&material.vertices);
            gpu.create_buffer_set(
                &format!("{label}/{}", material.name),
                vertex_data,
                &material.indices,
            )
        })
        .collect()
}
