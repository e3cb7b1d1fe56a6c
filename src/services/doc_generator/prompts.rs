//! LLM Prompt 模板
//!
//! 定义逐文件分析和四种总览文档的 Prompt 模板，以及消息构建函数。
//! 两种模式的输出契约一致：恰好两条消息，先 system 后 user。

use std::path::Path;

use super::types::{DocType, SourceFile};
use crate::llm::ChatMessage;

/// 逐文件分析 Prompt
pub const ELEMENT_DOC_PROMPT: &str = r#"Read the code provided, then perform a comprehensive evaluation.
Write documentation with the following sections:
    1. Element Details: answer the following for each element (function/class):
        - What is the element for?
        - What actions can it perform?
        - How can one implement their own?
        - Provide a sample code implementation.
    2. Simple Example: provide a simple example of how to use the element.

The top of the MDX output shall contain the following elements and in this format:
---
title: [the class or module name]
description: [One sentence describing the content]
---
THE ONLY OUTPUT IS MDX DOCUMENTATION.
"#;

/// 欢迎页 Prompt
pub const WELCOME_PROMPT: &str = r#"Write documentation with the following sections:
    1. Introduction: a brief introduction to the code.
    2. Overview: a general overview of what the code does.

Skip the following:
    - Running tests or anything concerning tests
    - Code structure
    - Copyright and license
    - Conclusion or footnotes

The top of the MDX output shall contain the following elements and in this format:
---
title: "Welcome"
sidebarTitle: "Welcome"
description: [One sentence describing the content]
---
THE ONLY OUTPUT IS MDX DOCUMENTATION.
"#;

/// 快速上手 Prompt
pub const QUICKSTART_PROMPT: &str = r#"Write documentation with the following sections:
    1. Introduction: a brief introduction to this quickstart.
    2. Quickstarts: simple examples or use cases.

Skip the following:
    - Running tests or anything concerning tests
    - Code structure
    - Copyright and license
    - Conclusion or footnotes

The top of the MDX output shall contain the following elements and in this format:
---
title: "Quick Start"
description: [One sentence describing the content]
---
THE ONLY OUTPUT IS MDX DOCUMENTATION.
"#;

/// "这是什么" Prompt
pub const WHAT_IS_IT_PROMPT: &str = r#"Write documentation for this code describing what it is. You are answering the question:
What is this code?

Skip the following:
    - Running tests or anything concerning tests
    - Code structure
    - Copyright and license
    - Conclusion or footnotes

The top of the MDX output shall contain the following elements and in this format:
---
title: "What Is It?"
description: [One sentence describing the content]
---
THE ONLY OUTPUT IS MDX DOCUMENTATION.
"#;

/// "工作原理" Prompt
pub const HOW_IT_WORKS_PROMPT: &str = r#"Write documentation for this code describing how it works. You are answering the question:
How does this work?

Skip the following:
    - Running tests or anything concerning tests
    - Code structure
    - Copyright and license
    - Conclusion or footnotes

The top of the MDX output shall contain the following elements and in this format:
---
title: "How Does It Work?"
description: [One sentence describing the content]
---
THE ONLY OUTPUT IS MDX DOCUMENTATION.
"#;

/// 总览模式的收尾指令
pub const CLOSING_INSTRUCTION: &str = "Perform a comprehensive review, following all instructions of the given, then produce MDX documentation.";

/// 按文档类型选择 system prompt
pub fn system_prompt(doc_type: DocType) -> &'static str {
    match doc_type {
        DocType::Welcome => WELCOME_PROMPT,
        DocType::Quickstart => QUICKSTART_PROMPT,
        DocType::WhatIsIt => WHAT_IS_IT_PROMPT,
        DocType::HowItWorks => HOW_IT_WORKS_PROMPT,
    }
}

/// 构建逐文件模式消息：固定 system prompt + 嵌入源码并重复指令的 user 消息
pub fn build_file_messages(code: &str) -> Vec<ChatMessage> {
    let prompt = format!(
        "Analyze this code:\n\n{}\n\n{}",
        code, ELEMENT_DOC_PROMPT
    );

    vec![
        ChatMessage::system(ELEMENT_DOC_PROMPT),
        ChatMessage::user(prompt),
    ]
}

/// 构建总览模式消息：按类型选择 system prompt，user 消息拼接全部源码
pub fn build_aggregate_messages(doc_type: DocType, files: &[SourceFile]) -> Vec<ChatMessage> {
    let overview = codebase_overview(files);
    let prompt = format!(
        "Analyze this code:\n\n{}\n\n{}",
        overview, CLOSING_INSTRUCTION
    );

    vec![
        ChatMessage::system(system_prompt(doc_type)),
        ChatMessage::user(prompt),
    ]
}

/// 拼接代码库总览：每个文件一个模块标题加代码块
pub fn codebase_overview(files: &[SourceFile]) -> String {
    let mut overview = String::from(
        "Generate a comprehensive documentation for a codebase. Here is an overview of the codebase structure:\n\n",
    );

    for file in files {
        let lang = Path::new(&file.relative_path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        overview.push_str(&format!(
            "### {}\n```{}\n{}\n```\n\n",
            module_heading(&file.relative_path),
            lang,
            file.content
        ));
    }

    overview
}

/// 路径转模块标题：去掉尾部扩展名，斜杠换成 " > " 分隔符
fn module_heading(relative_path: &str) -> String {
    let without_ext = Path::new(relative_path)
        .with_extension("")
        .to_string_lossy()
        .to_string();
    without_ext.replace('/', " > ")
}
