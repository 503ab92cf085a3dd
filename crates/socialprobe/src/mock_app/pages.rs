//! HTML documents served by the mock social app.
//!
//! Both documents are self-contained: inline styles and inline script, no
//! external assets. The demo page only talks to the backend through one
//! fire-and-forget registration call; the API demo is a small hash-routed
//! app that drives register, login, feed and profile through the mock API.

/// Path serving the demo page
pub const DEMO_PATH: &str = "/demo";
/// Path serving the API demo app
pub const API_DEMO_PATH: &str = "/api-demo";

/// The documents the mock origin can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockDocument {
    /// Interactive demo with a two step workflow
    Demo,
    /// Hash-routed register/login/feed/profile app
    ApiDemo,
}

impl MockDocument {
    /// Pick a document by exact path; unknown paths get the demo page
    #[must_use]
    pub fn for_path(path: &str) -> Self {
        match path {
            API_DEMO_PATH => Self::ApiDemo,
            _ => Self::Demo,
        }
    }

    /// Top level heading of the document
    #[must_use]
    pub const fn heading(&self) -> &'static str {
        match self {
            Self::Demo => "Mock Social App Demo",
            Self::ApiDemo => "API Demo",
        }
    }

    /// Render the full HTML document
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Demo => render_demo_page(),
            Self::ApiDemo => render_api_demo_page(),
        }
    }
}

/// Shared stylesheet for both documents
#[must_use]
pub fn render_styles() -> &'static str {
    r"
    body { font-family: Arial, sans-serif; max-width: 640px; margin: 48px auto; padding: 16px; color: #222; }
    [hidden] { display: none !important; }
    .section { margin: 20px 0; padding: 16px; border: 1px solid #ddd; border-radius: 8px; }
    button { padding: 8px 18px; margin: 4px; background: #1a73e8; color: #fff; border: 0; border-radius: 4px; cursor: pointer; }
    button:hover { background: #1558b0; }
    input { width: 220px; padding: 8px; margin: 4px; border: 1px solid #ccc; border-radius: 4px; }
    .result, .message { margin-top: 10px; padding: 10px; border-radius: 4px; background: #f4f6f8; }
    .message.success { background: #e6f4ea; }
    .message.error { background: #fce8e6; }
    .workflow-step { background: #e8f0fe; padding: 10px; border-radius: 4px; margin: 10px 0; }
    .post { padding: 12px; margin: 8px 0; border: 1px solid #eee; border-radius: 6px; }
    #stats span { margin-right: 16px; }
    "
}

/// The demo page at `/demo` (and every unknown path)
#[must_use]
pub fn render_demo_page() -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Mock Social App Demo</title>
<style>{styles}</style>
</head>
<body>
<h1>Mock Social App Demo</h1>
<p id="demo-content">This is a demonstration of Track B - Mock Social Application functionality.</p>

<div class="section">
  <h3>Basic Interaction Demo</h3>
  <button id="demo-button">Click Me</button>
  <div id="demo-result" class="result" hidden></div>
</div>

<div class="section">
  <h3>Mock Workflow Demo</h3>
  <button id="start-workflow">Start Registration Workflow</button>
  <div id="workflow-area" hidden>
    <div id="workflow-step" class="workflow-step">Step 1: Registration</div>
    <div id="step1">
      <input id="workflow-email" type="email" placeholder="Email">
      <input id="workflow-username" placeholder="Username">
      <button id="workflow-next">Next Step</button>
    </div>
    <div id="step2" hidden>
      <input id="workflow-fullname" placeholder="Full Name">
      <button id="workflow-finish">Complete Registration</button>
    </div>
    <div id="workflow-result" class="result" hidden></div>
  </div>
</div>

<script>
  const byId = (id) => document.getElementById(id);
  const reveal = (id, text) => {{
    const el = byId(id);
    el.textContent = text;
    el.hidden = false;
  }};

  byId('demo-button').addEventListener('click', () => {{
    reveal('demo-result', 'Button clicked successfully!');
  }});

  byId('start-workflow').addEventListener('click', () => {{
    byId('workflow-area').hidden = false;
  }});

  byId('workflow-next').addEventListener('click', () => {{
    const email = byId('workflow-email').value;
    const username = byId('workflow-username').value;
    if (!email || !username) {{
      return;
    }}
    byId('workflow-step').textContent = 'Step 2: Profile Setup';
    byId('step1').hidden = true;
    byId('step2').hidden = false;
    reveal('workflow-result', 'Registration completed for ' + username);
    fetch('/auth/register', {{
      method: 'POST',
      headers: {{ 'Content-Type': 'application/json' }},
      body: JSON.stringify({{ email, username }})
    }}).catch(() => console.log('registration call failed, workflow continues'));
  }});

  byId('workflow-finish').addEventListener('click', () => {{
    const fullname = byId('workflow-fullname').value;
    const username = byId('workflow-username').value;
    byId('workflow-step').textContent = 'Workflow Complete';
    byId('step2').hidden = true;
    reveal('workflow-result',
      'Welcome ' + username + '! Profile setup complete' + (fullname ? ' with name: ' + fullname : ''));
  }});
</script>
</body>
</html>
"##,
        styles = render_styles()
    )
}

/// The API demo app at `/api-demo`
///
/// Views live in `<template>` elements and are swapped into `#app` on hash
/// change, so only the active view's elements are in the document.
#[must_use]
pub fn render_api_demo_page() -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>API Demo</title>
<style>{styles}</style>
</head>
<body>
<main id="app">
  <section id="landing-page">
    <h1>API Demo</h1>
    <p id="api-demo-content">Register, log in, browse the feed and edit a profile against the mock API.</p>
    <a href="#/register">Create an account</a> | <a href="#/login">Log in</a>
  </section>
</main>

<template id="tpl-register">
  <section id="register-page">
    <h1>Create Account</h1>
    <input id="email" type="email" placeholder="Email">
    <input id="username" placeholder="Username">
    <input id="fullName" placeholder="Full Name">
    <input id="password" type="password" placeholder="Password">
    <button id="register-btn" type="button">Sign Up</button>
    <div id="success-message" class="message success" hidden></div>
    <div id="error-message" class="message error" hidden></div>
    <p>Already registered? <button id="go-to-login" type="button">Log In</button></p>
  </section>
</template>

<template id="tpl-login">
  <section id="login-page">
    <h1>Login</h1>
    <input id="username" placeholder="Username">
    <input id="password" type="password" placeholder="Password">
    <button id="login-btn" type="button">Log In</button>
    <button id="create-account" type="button">Create Account</button>
    <div id="error-message" class="message error" hidden></div>
  </section>
</template>

<template id="tpl-feed">
  <section id="feed-page">
    <h1>Feed</h1>
    <button id="profile-btn" type="button">Profile</button>
    <button id="logout-btn" type="button">Logout</button>
    <div id="posts"></div>
  </section>
</template>

<template id="tpl-profile">
  <section id="profile-page">
    <h1>Profile</h1>
    <p id="username-display"></p>
    <p id="fullname-display"></p>
    <div id="stats"><span>Posts: 5</span><span>Followers: 150</span><span>Following: 200</span></div>
    <button id="edit-profile" type="button">Edit Profile</button>
    <button id="back-to-feed" type="button">Back to Feed</button>
    <button id="logout-btn-profile" type="button">Logout</button>
    <div id="profile-form" hidden>
      <input id="edit-fullName" placeholder="Full Name">
      <button id="save-profile" type="button">Save</button>
      <button id="cancel-edit" type="button">Cancel</button>
    </div>
    <div id="update-success" class="message success" hidden></div>
  </section>
</template>

<script>
  const state = {{ token: null, user: null, username: '', fullName: '' }};
  const byId = (id) => document.getElementById(id);
  const val = (id) => byId(id).value;
  const say = (id, text) => {{
    const el = byId(id);
    el.textContent = text;
    el.hidden = false;
  }};

  const go = (view) => {{
    const hash = '#/' + view;
    if (location.hash === hash) {{
      render();
    }} else {{
      location.hash = hash;
    }}
  }};

  const logout = () => {{
    state.token = null;
    state.user = null;
    go('login');
  }};

  const postJson = async (path, body) => {{
    const res = await fetch(path, {{
      method: 'POST',
      headers: {{ 'Content-Type': 'application/json' }},
      body: JSON.stringify(body)
    }});
    return {{ status: res.status, ok: res.ok, data: await res.json() }};
  }};

  const views = {{
    register() {{
      byId('register-btn').addEventListener('click', async () => {{
        byId('success-message').hidden = true;
        byId('error-message').hidden = true;
        const body = {{
          email: val('email'),
          username: val('username'),
          fullName: val('fullName'),
          password: val('password')
        }};
        if (!body.email || !body.username || !body.password) {{
          say('error-message', 'Please fill in all required fields');
          return;
        }}
        try {{
          const res = await postJson('/auth/register', body);
          if (res.status === 201) {{
            state.fullName = body.fullName;
            say('success-message', res.data.message + ' for ' + res.data.username);
          }} else {{
            say('error-message', res.data.error || 'Registration failed');
          }}
        }} catch (err) {{
          say('error-message', 'Registration failed: ' + err.message);
        }}
      }});
      byId('go-to-login').addEventListener('click', () => go('login'));
    }},

    login() {{
      byId('login-btn').addEventListener('click', async () => {{
        byId('error-message').hidden = true;
        const username = val('username');
        const password = val('password');
        if (!username || !password) {{
          say('error-message', 'Please enter username and password');
          return;
        }}
        try {{
          const res = await postJson('/auth/login', {{ username, password }});
          if (!res.ok) {{
            say('error-message', res.data.error || 'Login failed');
            return;
          }}
          state.token = res.data.token;
          state.user = res.data.user;
          state.username = username;
          if (!state.fullName) {{
            state.fullName = res.data.user.fullName;
          }}
          go('feed');
        }} catch (err) {{
          say('error-message', 'Login failed: ' + err.message);
        }}
      }});
      byId('create-account').addEventListener('click', () => go('register'));
    }},

    feed() {{
      const posts = byId('posts');
      [
        'This is a mock post from the feed API.',
        'Mock posts keep the feed deterministic.'
      ].forEach((text) => {{
        const post = document.createElement('div');
        post.className = 'post';
        post.textContent = state.user.username + ': ' + text;
        posts.appendChild(post);
      }});
      byId('profile-btn').addEventListener('click', () => go('profile'));
      byId('logout-btn').addEventListener('click', logout);
    }},

    profile() {{
      byId('username-display').textContent = '@' + state.username;
      byId('fullname-display').textContent = state.fullName;
      byId('edit-profile').addEventListener('click', () => {{
        byId('edit-fullName').value = state.fullName;
        byId('update-success').hidden = true;
        byId('profile-form').hidden = false;
      }});
      byId('save-profile').addEventListener('click', () => {{
        state.fullName = val('edit-fullName');
        byId('fullname-display').textContent = state.fullName;
        byId('profile-form').hidden = true;
        say('update-success', 'Profile updated successfully');
      }});
      byId('cancel-edit').addEventListener('click', () => {{
        byId('profile-form').hidden = true;
      }});
      byId('back-to-feed').addEventListener('click', () => go('feed'));
      byId('logout-btn-profile').addEventListener('click', logout);
    }}
  }};

  function render() {{
    const view = location.hash.replace(/^#\//, '');
    const template = byId('tpl-' + view);
    if (!template || !views[view]) {{
      return;
    }}
    if ((view === 'feed' || view === 'profile') && !state.user) {{
      go('login');
      return;
    }}
    byId('app').replaceChildren(template.content.cloneNode(true));
    views[view]();
  }}

  window.addEventListener('hashchange', render);
  render();
</script>
</body>
</html>
"##,
        styles = render_styles()
    )
}
