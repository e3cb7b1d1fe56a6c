//! 业务服务模块

pub mod doc_generator;
