//! Starter project shown before the first generation.

const STARTER_APP: &str = r#"import React from 'react';

function App() {
    return (
        <div style={{
            display: 'flex',
            flexDirection: 'column',
            alignItems: 'center',
            justifyContent: 'center',
            minHeight: '100vh',
            background: 'linear-gradient(135deg, #0a0a0a 0%, #1a1a2e 100%)',
            color: 'white',
            fontFamily: 'Inter, system-ui, sans-serif',
            textAlign: 'center',
            padding: '40px 20px'
        }}>
            <h1 style={{ fontSize: 'clamp(2rem, 5vw, 3.5rem)', fontWeight: 800, marginBottom: '1rem' }}>
                Welcome to Lumina
            </h1>
            <p style={{ color: 'rgba(255,255,255,0.6)', fontSize: '1.1rem' }}>
                Describe what you want to build in the chat.
            </p>
            <p style={{ color: 'rgba(255,255,255,0.6)', fontSize: '1.1rem', marginTop: '0.5rem' }}>
                Your app will appear here instantly.
            </p>
        </div>
    );
}

export default App;"#;

const STARTER_STYLES: &str = r#"@import url('https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700;800&display=swap');

*, *::before, *::after {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

html, body {
    width: 100%;
    height: 100%;
}

body {
    font-family: 'Inter', system-ui, -apple-system, sans-serif;
    background: #0a0a0a;
    min-height: 100vh;
    color: #fff;
    -webkit-font-smoothing: antialiased;
}

#root {
    min-height: 100vh;
}"#;

pub fn starter_files() -> [(&'static str, &'static str); 2] {
    [("App.tsx", STARTER_APP), ("styles.css", STARTER_STYLES)]
}
