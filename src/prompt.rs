use crate::context::ExecutionContext;

/// Text sent to the model as the single user message.
///
/// Deliberately not `Debug`: the payload is never logged.
pub struct RequestPayload(String);

impl RequestPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Renders the context and the user's question into the request payload.
pub fn build_prompt(context: &ExecutionContext, question: &str) -> RequestPayload {
    let shell = &context.shell;
    RequestPayload(format!(
        "SYSTEM:
You are an expert, concise shell assistant. Your goal is to provide accurate, executable shell commands.

CONTEXT:
-  **OS:** {os}
-  **Shell:** {shell}
-  **CWD:** {cwd}
-  **User:** {user}
-  **Git Repo:** {git}
-  **Files (top 20):** {files}
-  **Available Tools:** {tools}

RULES:
1.  **Primary Goal:** Generate *only* the exact, executable shell command(s) for the `{shell}` environment.
2.  **Context is Key:** Use the CONTEXT (CWD, Files, OS) to write specific, correct commands.
3.  **No Banter:** Do NOT include greetings, sign-offs, or conversational filler (e.g., \"Here is the command:\").
4.  **Safety:** If a command is complex or destructive (e.g., `rm -rf`, `find -delete`), add a single-line comment (`# ...`) *after* the command explaining what it does.
5.  **Questions:** If the user asks a question (e.g., \"what is `ls`?\"), provide a concise, one-line answer. Do not output a command.
6.  **Ambiguity:** If the request is unclear, ask a single, direct clarifying question. Start the line with `#`.

REQUEST:
{question}

RESPONSE:
",
        os = context.os,
        shell = shell,
        cwd = context.cwd,
        user = context.user,
        git = if context.is_git_repo { "Yes" } else { "No" },
        files = context.files,
        tools = context.tools_display(),
        question = question,
    ))
}
