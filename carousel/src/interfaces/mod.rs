pub mod renderer_interface;
