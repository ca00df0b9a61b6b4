//! Signatures of the commonly used JDK types, written as Java stubs
//!
//! The stubs are parsed by this crate's own parser on first use and feed the
//! shared type table every compilation unit is attributed against.

pub(crate) const JDK_SOURCES: &[(&str, &str)] = &[
    (
        "java/lang/Object.java",
        r#"package java.lang;
public class Object {
    public Object() {}
    public native boolean equals(Object obj);
    public native int hashCode();
    public native String toString();
    public final native Class<?> getClass();
}
"#,
    ),
    (
        "java/lang/Class.java",
        r#"package java.lang;
public final class Class<T> {
    public native String getName();
    public native String getSimpleName();
}
"#,
    ),
    (
        "java/lang/Comparable.java",
        r#"package java.lang;
public interface Comparable<T> {
    int compareTo(T o);
}
"#,
    ),
    (
        "java/lang/CharSequence.java",
        r#"package java.lang;
public interface CharSequence {
    int length();
    char charAt(int index);
    boolean isEmpty();
}
"#,
    ),
    (
        "java/lang/Iterable.java",
        r#"package java.lang;
public interface Iterable<T> {
    java.util.Iterator<T> iterator();
    void forEach(java.util.function.Consumer<? super T> action);
}
"#,
    ),
    (
        "java/lang/Runnable.java",
        r#"package java.lang;
public interface Runnable {
    void run();
}
"#,
    ),
    (
        "java/lang/String.java",
        r#"package java.lang;
public final class String implements CharSequence, Comparable<String> {
    public String() {}
    public String(String original) {}
    public native int length();
    public native char charAt(int index);
    public native boolean isEmpty();
    public native boolean isBlank();
    public native boolean equals(Object other);
    public native boolean equalsIgnoreCase(String other);
    public native int compareTo(String other);
    public native boolean contains(CharSequence s);
    public native boolean startsWith(String prefix);
    public native boolean endsWith(String suffix);
    public native int indexOf(String str);
    public native int indexOf(int ch);
    public native String substring(int beginIndex);
    public native String substring(int beginIndex, int endIndex);
    public native String trim();
    public native String strip();
    public native String toLowerCase();
    public native String toUpperCase();
    public native String replace(CharSequence target, CharSequence replacement);
    public native String concat(String str);
    public native String repeat(int count);
    public native String[] split(String regex);
    public native char[] toCharArray();
    public static native String valueOf(Object obj);
    public static native String valueOf(int i);
    public static native String valueOf(long l);
    public static native String valueOf(double d);
    public static native String valueOf(boolean b);
    public static native String valueOf(char c);
    public static native String join(CharSequence delimiter, Iterable<? extends CharSequence> elements);
}
"#,
    ),
    (
        "java/lang/StringBuilder.java",
        r#"package java.lang;
public final class StringBuilder implements CharSequence {
    public StringBuilder() {}
    public StringBuilder(int capacity) {}
    public StringBuilder(String str) {}
    public native StringBuilder append(String str);
    public native StringBuilder append(Object obj);
    public native StringBuilder append(int i);
    public native StringBuilder append(long l);
    public native StringBuilder append(char c);
    public native StringBuilder append(boolean b);
    public native StringBuilder append(double d);
    public native StringBuilder insert(int offset, String str);
    public native StringBuilder reverse();
    public native int length();
    public native char charAt(int index);
    public native boolean isEmpty();
    public native String toString();
}
"#,
    ),
    (
        "java/lang/Number.java",
        r#"package java.lang;
public abstract class Number {
    public Number() {}
    public abstract int intValue();
    public abstract long longValue();
    public abstract float floatValue();
    public abstract double doubleValue();
}
"#,
    ),
    (
        "java/lang/Integer.java",
        r#"package java.lang;
public final class Integer extends Number implements Comparable<Integer> {
    public static final int MIN_VALUE = 0x80000000;
    public static final int MAX_VALUE = 0x7fffffff;
    public Integer(int value) {}
    public Integer(String s) {}
    public static native Integer valueOf(int i);
    public static native Integer valueOf(String s);
    public static native int parseInt(String s);
    public static native int parseInt(String s, int radix);
    public static native String toString(int i);
    public static native int compare(int x, int y);
    public static native int max(int a, int b);
    public static native int min(int a, int b);
    public static native int sum(int a, int b);
    public native int intValue();
    public native long longValue();
    public native float floatValue();
    public native double doubleValue();
    public native int compareTo(Integer other);
    public native boolean equals(Object obj);
    public native String toString();
}
"#,
    ),
    (
        "java/lang/Long.java",
        r#"package java.lang;
public final class Long extends Number implements Comparable<Long> {
    public static final long MIN_VALUE = 0x8000000000000000L;
    public static final long MAX_VALUE = 0x7fffffffffffffffL;
    public Long(long value) {}
    public Long(String s) {}
    public static native Long valueOf(long l);
    public static native Long valueOf(String s);
    public static native long parseLong(String s);
    public static native String toString(long l);
    public static native int compare(long x, long y);
    public native int intValue();
    public native long longValue();
    public native float floatValue();
    public native double doubleValue();
    public native int compareTo(Long other);
}
"#,
    ),
    (
        "java/lang/Double.java",
        r#"package java.lang;
public final class Double extends Number implements Comparable<Double> {
    public Double(double value) {}
    public Double(String s) {}
    public static native Double valueOf(double d);
    public static native Double valueOf(String s);
    public static native double parseDouble(String s);
    public static native String toString(double d);
    public static native boolean isNaN(double v);
    public static native int compare(double d1, double d2);
    public native int intValue();
    public native long longValue();
    public native float floatValue();
    public native double doubleValue();
    public native int compareTo(Double other);
}
"#,
    ),
    (
        "java/lang/Boolean.java",
        r#"package java.lang;
public final class Boolean implements Comparable<Boolean> {
    public static final Boolean TRUE = new Boolean(true);
    public static final Boolean FALSE = new Boolean(false);
    public Boolean(boolean value) {}
    public Boolean(String s) {}
    public static native Boolean valueOf(boolean b);
    public static native Boolean valueOf(String s);
    public static native boolean parseBoolean(String s);
    public static native String toString(boolean b);
    public native boolean booleanValue();
    public native int compareTo(Boolean other);
}
"#,
    ),
    (
        "java/lang/Character.java",
        r#"package java.lang;
public final class Character implements Comparable<Character> {
    public Character(char value) {}
    public static native Character valueOf(char c);
    public static native boolean isDigit(char ch);
    public static native boolean isLetter(char ch);
    public static native boolean isWhitespace(char ch);
    public static native char toUpperCase(char ch);
    public static native char toLowerCase(char ch);
    public native char charValue();
    public native int compareTo(Character other);
}
"#,
    ),
    (
        "java/lang/Math.java",
        r#"package java.lang;
public final class Math {
    public static final double PI = 3.141592653589793;
    public static final double E = 2.718281828459045;
    public static native int abs(int a);
    public static native long abs(long a);
    public static native float abs(float a);
    public static native double abs(double a);
    public static native int max(int a, int b);
    public static native long max(long a, long b);
    public static native float max(float a, float b);
    public static native double max(double a, double b);
    public static native int min(int a, int b);
    public static native long min(long a, long b);
    public static native float min(float a, float b);
    public static native double min(double a, double b);
    public static native double sqrt(double a);
    public static native double pow(double a, double b);
    public static native double floor(double a);
    public static native double ceil(double a);
    public static native long round(double a);
    public static native double random();
}
"#,
    ),
    (
        "java/lang/System.java",
        r#"package java.lang;
public final class System {
    public static final java.io.PrintStream out = null;
    public static final java.io.PrintStream err = null;
    public static native long currentTimeMillis();
    public static native long nanoTime();
    public static native String getProperty(String key);
    public static native String getenv(String name);
    public static native void exit(int status);
    public static native String lineSeparator();
}
"#,
    ),
    (
        "java/lang/Throwable.java",
        r#"package java.lang;
public class Throwable {
    public Throwable() {}
    public Throwable(String message) {}
    public Throwable(String message, Throwable cause) {}
    public Throwable(Throwable cause) {}
    public native String getMessage();
    public native Throwable getCause();
    public native void printStackTrace();
}
"#,
    ),
    (
        "java/lang/Exception.java",
        r#"package java.lang;
public class Exception extends Throwable {
    public Exception() {}
    public Exception(String message) {}
    public Exception(String message, Throwable cause) {}
    public Exception(Throwable cause) {}
}
"#,
    ),
    (
        "java/lang/RuntimeException.java",
        r#"package java.lang;
public class RuntimeException extends Exception {
    public RuntimeException() {}
    public RuntimeException(String message) {}
    public RuntimeException(String message, Throwable cause) {}
    public RuntimeException(Throwable cause) {}
}
"#,
    ),
    (
        "java/lang/IllegalArgumentException.java",
        r#"package java.lang;
public class IllegalArgumentException extends RuntimeException {
    public IllegalArgumentException() {}
    public IllegalArgumentException(String message) {}
}
"#,
    ),
    (
        "java/lang/IllegalStateException.java",
        r#"package java.lang;
public class IllegalStateException extends RuntimeException {
    public IllegalStateException() {}
    public IllegalStateException(String message) {}
}
"#,
    ),
    (
        "java/lang/NullPointerException.java",
        r#"package java.lang;
public class NullPointerException extends RuntimeException {
    public NullPointerException() {}
    public NullPointerException(String message) {}
}
"#,
    ),
    (
        "java/io/PrintStream.java",
        r#"package java.io;
public class PrintStream {
    public native void println();
    public native void println(boolean x);
    public native void println(char x);
    public native void println(int x);
    public native void println(long x);
    public native void println(float x);
    public native void println(double x);
    public native void println(String x);
    public native void println(Object x);
    public native void print(boolean b);
    public native void print(char c);
    public native void print(int i);
    public native void print(long l);
    public native void print(double d);
    public native void print(String s);
    public native void print(Object obj);
    public native void flush();
}
"#,
    ),
    (
        "java/util/Iterator.java",
        r#"package java.util;
public interface Iterator<E> {
    boolean hasNext();
    E next();
    void remove();
}
"#,
    ),
    (
        "java/util/Collection.java",
        r#"package java.util;
public interface Collection<E> extends Iterable<E> {
    int size();
    boolean isEmpty();
    boolean contains(Object o);
    boolean add(E e);
    boolean remove(Object o);
    boolean addAll(Collection<? extends E> c);
    void clear();
    java.util.stream.Stream<E> stream();
}
"#,
    ),
    (
        "java/util/List.java",
        r#"package java.util;
public interface List<E> extends Collection<E> {
    E get(int index);
    E set(int index, E element);
    void add(int index, E element);
    E remove(int index);
    int indexOf(Object o);
    List<E> subList(int fromIndex, int toIndex);
    static <E> List<E> of() ;
    static <E> List<E> of(E e1);
    static <E> List<E> of(E e1, E e2);
    static <E> List<E> of(E e1, E e2, E e3);
    static <E> List<E> copyOf(Collection<? extends E> coll);
}
"#,
    ),
    (
        "java/util/ArrayList.java",
        r#"package java.util;
public class ArrayList<E> implements List<E> {
    public ArrayList() {}
    public ArrayList(int initialCapacity) {}
    public ArrayList(Collection<? extends E> c) {}
}
"#,
    ),
    (
        "java/util/LinkedList.java",
        r#"package java.util;
public class LinkedList<E> implements List<E> {
    public LinkedList() {}
    public LinkedList(Collection<? extends E> c) {}
    public native E getFirst();
    public native E getLast();
}
"#,
    ),
    (
        "java/util/Set.java",
        r#"package java.util;
public interface Set<E> extends Collection<E> {
    static <E> Set<E> of();
    static <E> Set<E> of(E e1);
}
"#,
    ),
    (
        "java/util/HashSet.java",
        r#"package java.util;
public class HashSet<E> implements Set<E> {
    public HashSet() {}
    public HashSet(Collection<? extends E> c) {}
}
"#,
    ),
    (
        "java/util/Map.java",
        r#"package java.util;
public interface Map<K, V> {
    int size();
    boolean isEmpty();
    boolean containsKey(Object key);
    boolean containsValue(Object value);
    V get(Object key);
    V getOrDefault(Object key, V defaultValue);
    V put(K key, V value);
    V putIfAbsent(K key, V value);
    V remove(Object key);
    void clear();
    Set<K> keySet();
    Collection<V> values();
    static <K, V> Map<K, V> of();
    static <K, V> Map<K, V> of(K k1, V v1);
}
"#,
    ),
    (
        "java/util/HashMap.java",
        r#"package java.util;
public class HashMap<K, V> implements Map<K, V> {
    public HashMap() {}
    public HashMap(int initialCapacity) {}
    public HashMap(Map<? extends K, ? extends V> m) {}
}
"#,
    ),
    (
        "java/util/Objects.java",
        r#"package java.util;
public final class Objects {
    public static native boolean equals(Object a, Object b);
    public static native int hashCode(Object o);
    public static native String toString(Object o);
    public static native String toString(Object o, String nullDefault);
    public static native boolean isNull(Object obj);
    public static native boolean nonNull(Object obj);
    public static native <T> T requireNonNull(T obj);
    public static native <T> T requireNonNull(T obj, String message);
    public static native <T> T requireNonNullElse(T obj, T defaultObj);
}
"#,
    ),
    (
        "java/util/Collections.java",
        r#"package java.util;
public class Collections {
    public static native <T> List<T> emptyList();
    public static native <T> Set<T> emptySet();
    public static native <K, V> Map<K, V> emptyMap();
    public static native <T> List<T> singletonList(T o);
    public static native <T> List<T> unmodifiableList(List<? extends T> list);
    public static native void reverse(List<?> list);
}
"#,
    ),
    (
        "java/util/Optional.java",
        r#"package java.util;
public final class Optional<T> {
    public static native <T> Optional<T> empty();
    public static native <T> Optional<T> of(T value);
    public static native <T> Optional<T> ofNullable(T value);
    public native T get();
    public native boolean isPresent();
    public native boolean isEmpty();
    public native T orElse(T other);
    public native <U> Optional<U> map(java.util.function.Function<? super T, ? extends U> mapper);
}
"#,
    ),
    (
        "java/util/stream/Stream.java",
        r#"package java.util.stream;
public interface Stream<T> {
    Stream<T> filter(java.util.function.Predicate<? super T> predicate);
    <R> Stream<R> map(java.util.function.Function<? super T, ? extends R> mapper);
    void forEach(java.util.function.Consumer<? super T> action);
    long count();
    java.util.List<T> toList();
}
"#,
    ),
    (
        "java/util/function/Function.java",
        r#"package java.util.function;
public interface Function<T, R> {
    R apply(T t);
}
"#,
    ),
    (
        "java/util/function/BiFunction.java",
        r#"package java.util.function;
public interface BiFunction<T, U, R> {
    R apply(T t, U u);
}
"#,
    ),
    (
        "java/util/function/Supplier.java",
        r#"package java.util.function;
public interface Supplier<T> {
    T get();
}
"#,
    ),
    (
        "java/util/function/Consumer.java",
        r#"package java.util.function;
public interface Consumer<T> {
    void accept(T t);
}
"#,
    ),
    (
        "java/util/function/Predicate.java",
        r#"package java.util.function;
public interface Predicate<T> {
    boolean test(T t);
}
"#,
    ),
];
