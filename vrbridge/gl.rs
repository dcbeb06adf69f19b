/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The GL-backed [`Graphics`] implementation. Owns no context of its
//! own; the host creates the context and hands over a function table.

use sparkle::gl;
use sparkle::gl::GLint;
use sparkle::gl::GLsizei;
use sparkle::gl::GLuint;
use sparkle::gl::Gl;
use sparkle::gl::TexImageSource;

use std::mem;
use std::rc::Rc;

use vrbridge_api::Error;
use vrbridge_api::Graphics;
use vrbridge_api::ModelMesh;
use vrbridge_api::ModelTexture;
use vrbridge_api::ModelVertex;
use vrbridge_api::TextureHandle;

pub struct GlGraphics {
    gl: Rc<Gl>,
}

impl GlGraphics {
    pub fn new(gl: Rc<Gl>) -> GlGraphics {
        GlGraphics { gl }
    }
}

/// One eye's GPU objects: a multisampled color+depth framebuffer and the
/// single-sampled resolve framebuffer it blits into.
pub struct GlEyeTarget {
    render_framebuffer: GLuint,
    color_renderbuffer: GLuint,
    depth_renderbuffer: GLuint,
    resolve_framebuffer: GLuint,
    resolve_texture: GLuint,
}

pub struct GlModel {
    vertex_array: GLuint,
    vertex_buffer: GLuint,
    index_buffer: GLuint,
    texture: GLuint,
    index_count: GLsizei,
}

impl Graphics for GlGraphics {
    type EyeTarget = GlEyeTarget;
    type Model = GlModel;

    fn create_eye_target(
        &mut self,
        width: u32,
        height: u32,
        samples: u32,
    ) -> Result<GlEyeTarget, Error> {
        let gl = &self.gl;
        let width = width as GLsizei;
        let height = height as GLsizei;

        let render_framebuffer = gl.gen_framebuffers(1)[0];
        gl.bind_framebuffer(gl::FRAMEBUFFER, render_framebuffer);

        let depth_renderbuffer = gl.gen_renderbuffers(1)[0];
        gl.bind_renderbuffer(gl::RENDERBUFFER, depth_renderbuffer);
        gl.renderbuffer_storage_multisample(
            gl::RENDERBUFFER,
            samples as GLsizei,
            gl::DEPTH_COMPONENT24,
            width,
            height,
        );
        gl.framebuffer_renderbuffer(
            gl::FRAMEBUFFER,
            gl::DEPTH_ATTACHMENT,
            gl::RENDERBUFFER,
            depth_renderbuffer,
        );

        let color_renderbuffer = gl.gen_renderbuffers(1)[0];
        gl.bind_renderbuffer(gl::RENDERBUFFER, color_renderbuffer);
        gl.renderbuffer_storage_multisample(
            gl::RENDERBUFFER,
            samples as GLsizei,
            gl::RGBA8,
            width,
            height,
        );
        gl.framebuffer_renderbuffer(
            gl::FRAMEBUFFER,
            gl::COLOR_ATTACHMENT0,
            gl::RENDERBUFFER,
            color_renderbuffer,
        );

        let status = gl.check_framebuffer_status(gl::FRAMEBUFFER);
        if status != gl::FRAMEBUFFER_COMPLETE {
            gl.bind_framebuffer(gl::FRAMEBUFFER, 0);
            gl.delete_framebuffers(&[render_framebuffer]);
            gl.delete_renderbuffers(&[color_renderbuffer, depth_renderbuffer]);
            return Err(Error::IncompleteFramebuffer(status));
        }

        let resolve_framebuffer = gl.gen_framebuffers(1)[0];
        gl.bind_framebuffer(gl::FRAMEBUFFER, resolve_framebuffer);

        let resolve_texture = gl.gen_textures(1)[0];
        gl.bind_texture(gl::TEXTURE_2D, resolve_texture);
        gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
        gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_MAX_LEVEL, 0);
        gl.tex_image_2d(
            gl::TEXTURE_2D,
            0,
            gl::RGBA8 as GLint,
            width,
            height,
            0,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            TexImageSource::Pixels(None),
        );
        gl.framebuffer_texture_2d(
            gl::FRAMEBUFFER,
            gl::COLOR_ATTACHMENT0,
            gl::TEXTURE_2D,
            resolve_texture,
            0,
        );

        let status = gl.check_framebuffer_status(gl::FRAMEBUFFER);
        gl.bind_framebuffer(gl::FRAMEBUFFER, 0);
        if status != gl::FRAMEBUFFER_COMPLETE {
            gl.delete_framebuffers(&[render_framebuffer, resolve_framebuffer]);
            gl.delete_renderbuffers(&[color_renderbuffer, depth_renderbuffer]);
            gl.delete_textures(&[resolve_texture]);
            return Err(Error::IncompleteFramebuffer(status));
        }
        debug_assert_eq!(gl.get_error(), gl::NO_ERROR);

        Ok(GlEyeTarget {
            render_framebuffer,
            color_renderbuffer,
            depth_renderbuffer,
            resolve_framebuffer,
            resolve_texture,
        })
    }

    fn destroy_eye_target(&mut self, target: &GlEyeTarget) {
        let gl = &self.gl;
        gl.delete_framebuffers(&[target.render_framebuffer, target.resolve_framebuffer]);
        gl.delete_renderbuffers(&[target.color_renderbuffer, target.depth_renderbuffer]);
        gl.delete_textures(&[target.resolve_texture]);
    }

    fn begin_eye_pass(&mut self, target: &GlEyeTarget, width: u32, height: u32) {
        let gl = &self.gl;
        gl.enable(gl::MULTISAMPLE);
        gl.bind_framebuffer(gl::FRAMEBUFFER, target.render_framebuffer);
        gl.viewport(0, 0, width as GLsizei, height as GLsizei);
    }

    fn resolve_eye_pass(&mut self, target: &GlEyeTarget, width: u32, height: u32) {
        let gl = &self.gl;
        let width = width as GLsizei;
        let height = height as GLsizei;

        gl.bind_framebuffer(gl::FRAMEBUFFER, 0);
        gl.disable(gl::MULTISAMPLE);

        gl.bind_framebuffer(gl::READ_FRAMEBUFFER, target.render_framebuffer);
        gl.bind_framebuffer(gl::DRAW_FRAMEBUFFER, target.resolve_framebuffer);
        gl.blit_framebuffer(
            0,
            0,
            width,
            height,
            0,
            0,
            width,
            height,
            gl::COLOR_BUFFER_BIT,
            gl::LINEAR,
        );
        gl.bind_framebuffer(gl::READ_FRAMEBUFFER, 0);
        gl.bind_framebuffer(gl::DRAW_FRAMEBUFFER, 0);

        gl.enable(gl::MULTISAMPLE);
    }

    fn resolve_texture(&self, target: &GlEyeTarget) -> TextureHandle {
        TextureHandle::OpenGl(target.resolve_texture)
    }

    fn upload_model(
        &mut self,
        mesh: &ModelMesh,
        texture: &ModelTexture,
    ) -> Result<GlModel, Error> {
        let expected = texture.width as usize * texture.height as usize * 4;
        if texture.data.len() != expected {
            return Err(Error::RenderModel(format!(
                "texture payload is {} bytes, expected {}",
                texture.data.len(),
                expected
            )));
        }

        let gl = &self.gl;
        let stride = mem::size_of::<ModelVertex>() as GLsizei;

        let vertex_array = gl.gen_vertex_arrays(1)[0];
        gl.bind_vertex_array(vertex_array);

        let vertex_buffer = gl.gen_buffers(1)[0];
        gl.bind_buffer(gl::ARRAY_BUFFER, vertex_buffer);
        unsafe {
            gl.buffer_data(
                gl::ARRAY_BUFFER,
                (mesh.vertices.len() * mem::size_of::<ModelVertex>()) as isize,
                mesh.vertices.as_ptr() as *const _,
                gl::STATIC_DRAW,
            );
        }

        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer(0, 3, gl::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer(1, 3, gl::FLOAT, false, stride, 12);
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer(2, 2, gl::FLOAT, false, stride, 24);

        let index_buffer = gl.gen_buffers(1)[0];
        gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, index_buffer);
        unsafe {
            gl.buffer_data(
                gl::ELEMENT_ARRAY_BUFFER,
                (mesh.indices.len() * mem::size_of::<u16>()) as isize,
                mesh.indices.as_ptr() as *const _,
                gl::STATIC_DRAW,
            );
        }

        gl.bind_vertex_array(0);

        let gl_texture = gl.gen_textures(1)[0];
        gl.bind_texture(gl::TEXTURE_2D, gl_texture);
        gl.tex_image_2d(
            gl::TEXTURE_2D,
            0,
            gl::RGBA as GLint,
            texture.width as GLsizei,
            texture.height as GLsizei,
            0,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            TexImageSource::Pixels(Some(&texture.data)),
        );
        gl.generate_mipmap(gl::TEXTURE_2D);
        gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint);
        gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as GLint);
        gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
        gl.tex_parameter_i(
            gl::TEXTURE_2D,
            gl::TEXTURE_MIN_FILTER,
            gl::LINEAR_MIPMAP_LINEAR as GLint,
        );
        gl.bind_texture(gl::TEXTURE_2D, 0);
        debug_assert_eq!(gl.get_error(), gl::NO_ERROR);

        Ok(GlModel {
            vertex_array,
            vertex_buffer,
            index_buffer,
            texture: gl_texture,
            index_count: mesh.indices.len() as GLsizei,
        })
    }

    fn destroy_model(&mut self, model: &GlModel) {
        let gl = &self.gl;
        gl.delete_buffers(&[model.vertex_buffer, model.index_buffer]);
        gl.delete_vertex_arrays(&[model.vertex_array]);
        gl.delete_textures(&[model.texture]);
    }

    fn draw_model(&mut self, model: &GlModel) {
        let gl = &self.gl;
        gl.bind_vertex_array(model.vertex_array);
        gl.active_texture(gl::TEXTURE0);
        gl.bind_texture(gl::TEXTURE_2D, model.texture);
        gl.draw_elements(gl::TRIANGLES, model.index_count, gl::UNSIGNED_SHORT, 0);
        gl.bind_vertex_array(0);
    }
}
